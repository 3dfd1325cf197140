//! # MRI Report
//!
//! 上传脑部 MRI 影像，获取肿瘤分类结果与 Grad-CAM 热力图，并导出固定版式的 PDF 诊断报告
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 远程分类服务的调用能力
//! - `Classifier` - 分类能力（trait，测试中可替换）
//! - `HttpClassifier` - `POST /predict`，multipart 上传
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一次提交"的完整流程
//! - `SubmissionController` - 状态机（Idle → FileChosen → Submitting → Completed / Failed）
//! - `ResultHandoff` - 提交完成后交给报告层的只读结果
//!
//! ### ③ 报告层（Report）
//! - `report/` - 诊断文字、结果摘要、单页版面和 PDF 编码
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 一次分析会话：选择 → 提交 → 摘要 → 导出
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{Classifier, HttpClassifier};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AnalysisResult, ImageFile, PatientRecord};
pub use orchestrator::{export_report, AnalysisRequest, App};
pub use report::{render, render_handoff, ReportDocument, ResultView};
pub use workflow::{ResultHandoff, SubmissionController, SubmissionPhase, SubmissionState};
