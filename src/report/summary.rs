//! 结果摘要
//!
//! 分析完成后展示给操作员的内容：诊断、置信度、热力图和导出入口。

use std::fmt::Display;

use crate::models::AnalysisResult;
use crate::report::diagnosis::format_diagnosis;

pub const NO_RESULT_MESSAGE: &str = "No result available.";
pub const SUMMARY_HEADING: &str = "Analysis Result";
pub const FINDING_HEADING: &str = "Primary Finding";
pub const EXPORT_LABEL: &str = "Download Diagnostic Report (PDF)";

#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub diagnosis: String,
    pub confidence: String,
    pub heatmap_uri: String,
}

impl ResultSummary {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            diagnosis: format_diagnosis(&result.tumor_type),
            confidence: format!("Confidence Score: {}", result.confidence_text()),
            heatmap_uri: result.heatmap.data_uri(),
        }
    }
}

/// 结果视图：没有结果时只显示占位文字
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    Unavailable,
    Ready(ResultSummary),
}

impl ResultView {
    pub fn from_result(result: Option<&AnalysisResult>) -> Self {
        match result {
            Some(result) => ResultView::Ready(ResultSummary::from_result(result)),
            None => ResultView::Unavailable,
        }
    }

    pub fn summary(&self) -> Option<&ResultSummary> {
        match self {
            ResultView::Ready(summary) => Some(summary),
            ResultView::Unavailable => None,
        }
    }

    /// 是否提供导出入口
    pub fn export_available(&self) -> bool {
        matches!(self, ResultView::Ready(_))
    }
}

impl Display for ResultView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultView::Unavailable => write!(f, "{}", NO_RESULT_MESSAGE),
            ResultView::Ready(summary) => {
                writeln!(f, "{}", SUMMARY_HEADING)?;
                writeln!(f, "{}: {}", FINDING_HEADING, summary.diagnosis)?;
                writeln!(f, "{}", summary.confidence)?;
                write!(f, "[{}]", EXPORT_LABEL)
            }
        }
    }
}
