//! 报告层
//!
//! - `diagnosis` - 诊断文字格式化
//! - `summary` - 分析完成后的结果摘要
//! - `layout` - 单页报告的版面（纯函数，坐标单位毫米）
//! - `pdf` - 把版面编码为 PDF 字节
//! - `fonts` - Helvetica 字宽表，用于对齐和换行

pub mod diagnosis;
pub mod fonts;
pub mod layout;
pub mod pdf;
pub mod summary;

pub use diagnosis::format_diagnosis;
pub use layout::{render, render_at, render_handoff, ReportDocument, ReportId, ReportStamp};
pub use summary::{ResultSummary, ResultView, NO_RESULT_MESSAGE};
