//! 分析会话 - 编排层
//!
//! ## 职责
//!
//! 串起一次完整的操作：读取影像 → 选择文件 → 校验表单 → 提交分析 → 展示摘要 → 导出报告。
//!
//! - 不做具体业务判断，只调度 workflow 和 report
//! - 提交失败时确认失败状态，让控制器回到 Idle，下次提交可以直接开始
//! - 所有错误在这里加上上下文，交给 `main` 输出

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::clients::{Classifier, HttpClassifier};
use crate::config::Config;
use crate::models::{ImageFile, PatientRecord};
use crate::report::{render_handoff, ResultView};
use crate::utils::logging::{log_startup, log_submission, log_summary};
use crate::workflow::{ResultHandoff, SubmissionController};

/// 一次分析请求（表单内容）
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub patient_name: String,
    /// 年龄原始输入，提交时校验
    pub age: String,
    pub image_path: PathBuf,
}

/// 应用主结构
pub struct App<C = HttpClassifier> {
    config: Config,
    controller: SubmissionController<C>,
}

impl App<HttpClassifier> {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        log_startup(&config);
        let classifier = HttpClassifier::new(&config);
        Self::with_classifier(config, classifier)
    }
}

impl<C: Classifier + 'static> App<C> {
    pub fn with_classifier(config: Config, classifier: C) -> Self {
        Self {
            config,
            controller: SubmissionController::new(classifier),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn controller(&self) -> &SubmissionController<C> {
        &self.controller
    }

    /// 运行一次分析
    ///
    /// # 返回
    /// 导出的 PDF 路径
    pub async fn run(&self, request: &AnalysisRequest) -> Result<PathBuf> {
        let file = ImageFile::read(&request.image_path)
            .await
            .with_context(|| {
                format!("读取影像文件失败: {}", request.image_path.display())
            })?;
        let file_name = file.file_name.clone();

        self.controller
            .select_file(Some(file))
            .context("选择影像文件失败")?;

        let patient = PatientRecord::from_form(&request.patient_name, &request.age)
            .context("患者信息校验失败")?;
        log_submission(&patient, &file_name);

        let handoff = match self.controller.submit(patient).await {
            Ok(handoff) => handoff,
            Err(e) => {
                if self.controller.acknowledge_failure() {
                    warn!("⚠️ 已确认失败，状态复位，可重新提交");
                }
                return Err(e).context("分析失败");
            }
        };

        log_summary(&ResultView::from_result(Some(handoff.result())));

        let path = export_report(&handoff, Path::new(&self.config.output_dir)).await?;
        info!("📄 报告已保存至: {}", path.display());
        Ok(path)
    }
}

/// 导出诊断报告
///
/// # 参数
/// - `handoff`: 提交完成后交出的结果
/// - `output_dir`: 输出目录（不存在时创建）
///
/// # 返回
/// 写入的 PDF 文件路径，文件名为 `MRI_Report_<报告编号>.pdf`
pub async fn export_report(handoff: &ResultHandoff, output_dir: &Path) -> Result<PathBuf> {
    let document = render_handoff(handoff).context("生成报告失败")?;
    let bytes = document.to_pdf().map_err(|e| {
        error!("❌ 报告编码失败: {}", e);
        e
    })?;

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("创建输出目录失败: {}", output_dir.display()))?;

    let path = output_dir.join(document.suggested_filename());
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("写入报告失败: {}", path.display()))?;

    info!("✓ 报告 {} 已导出 ({} 字节)", document.report_id(), bytes.len());
    Ok(path)
}
