//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次分析会话的调度，是整个系统的"指挥中心"。
//!
//! ### `app` - 分析会话
//! - 管理应用生命周期（初始化、运行）
//! - 读取影像文件，交给提交控制器
//! - 输出结果摘要，导出 PDF 报告
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (一次会话)
//!     ↓
//! workflow::SubmissionController (状态机 + 最短分析时长)
//!     ↓
//! clients::Classifier (分类服务)
//!
//! orchestrator::export_report
//!     ↓
//! report (版面 → PDF)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → workflow / report → clients / models
//! 2. **无业务逻辑**：只做调度和日志，不做具体业务判断

pub mod app;

// 重新导出主要类型
pub use app::{export_report, AnalysisRequest, App};
