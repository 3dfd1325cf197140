//! 分析提交流程 - 流程层
//!
//! 核心职责：驱动"未选择文件 → 已选择 → 分析中 → 完成"的状态机
//!
//! 流程顺序：
//! 1. 选择图像（只接受图像，替换旧的选择）
//! 2. 提交：发出唯一一次 multipart 请求
//! 3. 响应返回后，补足最短分析时长（2.5 秒）
//! 4. 成功 → Completed，交出 `ResultHandoff`；失败 → Failed，错误返回给调用方
//!
//! 同一时间只允许一个提交；请求在独立任务中执行，持有取消令牌，
//! 提交 future 被丢弃时请求仍会跑完，但状态会立即复位。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clients::Classifier;
use crate::error::{AppResult, ClassifierError, SubmissionError, ValidationError};
use crate::models::{AnalysisResult, ImageFile, ImageSelection, ImageUpload, PatientRecord};
use crate::workflow::handoff::ResultHandoff;

/// 最短分析时长（毫秒）
pub const FLOOR_MS: u64 = 2500;

/// 最短分析时长
pub const ANALYSIS_FLOOR: Duration = Duration::from_millis(FLOOR_MS);

/// 状态机阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    FileChosen,
    Submitting,
    Completed,
    Failed,
}

impl SubmissionPhase {
    /// 提交按钮是否可用
    pub fn submit_enabled(self) -> bool {
        self == SubmissionPhase::FileChosen
    }

    /// 提交按钮文字
    pub fn submit_label(self) -> &'static str {
        match self {
            SubmissionPhase::Submitting => "Analyzing...",
            _ => "Run AI Analysis",
        }
    }
}

/// 状态机状态（携带各阶段拥有的数据）
#[derive(Debug)]
pub enum SubmissionState {
    /// 未选择文件
    Idle,
    /// 已选择文件，等待提交
    FileChosen(ImageSelection),
    /// 请求进行中（文件已移交给请求，令牌只属于这一次请求）
    Submitting {
        file_name: String,
        cancel: CancellationToken,
    },
    /// 分析完成
    Completed(ResultHandoff),
    /// 分析失败，确认后回到 Idle
    Failed { reason: String },
}

impl SubmissionState {
    pub fn phase(&self) -> SubmissionPhase {
        match self {
            SubmissionState::Idle => SubmissionPhase::Idle,
            SubmissionState::FileChosen(_) => SubmissionPhase::FileChosen,
            SubmissionState::Submitting { .. } => SubmissionPhase::Submitting,
            SubmissionState::Completed(_) => SubmissionPhase::Completed,
            SubmissionState::Failed { .. } => SubmissionPhase::Failed,
        }
    }

    /// 当前选中的图像
    pub fn selection(&self) -> Option<&ImageSelection> {
        match self {
            SubmissionState::FileChosen(selection) => Some(selection),
            _ => None,
        }
    }

    /// 完成后的交接对象
    pub fn handoff(&self) -> Option<&ResultHandoff> {
        match self {
            SubmissionState::Completed(handoff) => Some(handoff),
            _ => None,
        }
    }

    /// 失败原因
    pub fn failure(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// 响应返回后还需要等待的时长
pub fn remaining_floor(floor: Duration, elapsed: Duration) -> Duration {
    floor.saturating_sub(elapsed)
}

/// 提交控制器
///
/// - 独占持有选中的图像
/// - 保证同一时间只有一个请求
/// - 所有退出路径都只清理一次"进行中"标记
pub struct SubmissionController<C> {
    classifier: Arc<C>,
    state: watch::Sender<SubmissionState>,
    floor: Duration,
}

impl<C: Classifier + 'static> SubmissionController<C> {
    /// 创建新的提交控制器
    pub fn new(classifier: C) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            classifier: Arc::new(classifier),
            state,
            floor: ANALYSIS_FLOOR,
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.state.borrow().phase()
    }

    /// 读取当前状态
    pub fn state(&self) -> watch::Ref<'_, SubmissionState> {
        self.state.borrow()
    }

    /// 订阅状态变化（界面据此切换"分析中"效果、禁用按钮）
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// 当前的交接对象（仅 Completed 状态下存在）
    pub fn handoff(&self) -> Option<ResultHandoff> {
        self.state.borrow().handoff().cloned()
    }

    /// 进行中请求的取消令牌（仅 Submitting 状态下存在）
    ///
    /// 流程本身从不取消；取消只影响当前这一次提交，它以 Failed 结束。
    pub fn cancel_token(&self) -> Option<CancellationToken> {
        match &*self.state.borrow() {
            SubmissionState::Submitting { cancel, .. } => Some(cancel.clone()),
            _ => None,
        }
    }

    /// 选择图像文件
    ///
    /// - `None` 或空文件：不做任何事
    /// - 非图像：返回错误，状态不变
    /// - 分析中：返回 `Busy`
    /// - 其它情况：替换旧的选择，清除上一次的结果或错误
    pub fn select_file(&self, file: Option<ImageFile>) -> AppResult<()> {
        let Some(file) = file.filter(|f| !f.bytes.is_empty()) else {
            debug!("未选择文件，状态保持不变");
            return Ok(());
        };

        let selection = ImageSelection::from_file(file)?;
        let file_name = selection.file_name().to_string();
        let size = selection.len();

        let mut busy = false;
        self.state.send_if_modified(|state| {
            if state.phase() == SubmissionPhase::Submitting {
                busy = true;
                return false;
            }
            *state = SubmissionState::FileChosen(selection);
            true
        });

        if busy {
            warn!("⚠️ 分析进行中，忽略新的文件选择: {}", file_name);
            return Err(SubmissionError::Busy.into());
        }

        info!("🖼️ 已选择图像: {} ({} 字节)", file_name, size);
        Ok(())
    }

    /// 确认失败，回到 Idle
    pub fn acknowledge_failure(&self) -> bool {
        self.state.send_if_modified(|state| {
            if state.phase() == SubmissionPhase::Failed {
                *state = SubmissionState::Idle;
                true
            } else {
                false
            }
        })
    }

    /// 提交分析
    ///
    /// # 参数
    /// - `patient`: 表单中的患者信息
    ///
    /// # 返回
    /// 成功时返回交接对象；失败时状态为 Failed，错误原样返回
    pub async fn submit(&self, patient: PatientRecord) -> AppResult<ResultHandoff> {
        patient.validate()?;

        let (selection, cancel) = self.begin()?;
        let in_flight = InFlight::new(&self.state);

        info!(
            "🧠 开始分析: {} | 患者: {}",
            selection.file_name(),
            patient.name
        );

        let started = Instant::now();
        let outcome = self.dispatch(selection.into_upload(), cancel).await;

        if !matches!(outcome, Err(ClassifierError::Cancelled)) {
            self.hold_floor(started).await;
        }

        match outcome {
            Ok(result) => {
                let handoff = ResultHandoff::new(patient, result);
                info!(
                    "✓ 分析完成 {} | 耗时 {} ms",
                    handoff,
                    started.elapsed().as_millis()
                );
                in_flight.settle(SubmissionState::Completed(handoff.clone()));
                Ok(handoff)
            }
            Err(e) => {
                error!("❌ 分析失败: {}", e);
                in_flight.settle(SubmissionState::Failed {
                    reason: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// 原子地取出选中的图像并进入 Submitting
    fn begin(&self) -> AppResult<(ImageSelection, CancellationToken)> {
        let mut taken = None;
        let mut busy = false;

        self.state.send_if_modified(|state| {
            match std::mem::replace(state, SubmissionState::Idle) {
                SubmissionState::FileChosen(selection) => {
                    let cancel = CancellationToken::new();
                    *state = SubmissionState::Submitting {
                        file_name: selection.file_name().to_string(),
                        cancel: cancel.clone(),
                    };
                    taken = Some((selection, cancel));
                    true
                }
                other => {
                    busy = other.phase() == SubmissionPhase::Submitting;
                    *state = other;
                    false
                }
            }
        });

        match taken {
            Some(taken) => Ok(taken),
            None if busy => {
                warn!("⚠️ 已有分析任务进行中，忽略本次提交");
                Err(SubmissionError::Busy.into())
            }
            None => Err(ValidationError::MissingFile.into()),
        }
    }

    /// 在独立任务中发出请求
    async fn dispatch(
        &self,
        upload: ImageUpload,
        token: CancellationToken,
    ) -> Result<AnalysisResult, ClassifierError> {
        let classifier = Arc::clone(&self.classifier);

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => Err(ClassifierError::Cancelled),
                result = classifier.classify(upload) => result,
            }
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(ClassifierError::TaskFailed(e.to_string())),
        }
    }

    /// 补足最短分析时长
    async fn hold_floor(&self, started: Instant) {
        let remaining = remaining_floor(self.floor, started.elapsed());
        if !remaining.is_zero() {
            debug!("响应已返回，继续等待 {} ms", remaining.as_millis());
            sleep(remaining).await;
        }
    }
}

/// "进行中"标记
///
/// `settle` 写入最终状态；未 settle 就被丢弃时复位为 Idle。
struct InFlight<'a> {
    state: &'a watch::Sender<SubmissionState>,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a watch::Sender<SubmissionState>) -> Self {
        Self {
            state,
            settled: false,
        }
    }

    fn settle(mut self, next: SubmissionState) {
        self.settled = true;
        self.state.send_replace(next);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("⚠️ 提交在完成前被丢弃，状态复位为 Idle");
            self.state.send_replace(SubmissionState::Idle);
        }
    }
}
