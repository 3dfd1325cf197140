//! 结果交接
//!
//! 提交成功时，患者信息与分析结果作为一个不可变的值一起交给报告生成器

use std::fmt::Display;
use std::sync::Arc;

use crate::models::{AnalysisResult, PatientRecord};

/// 提交流程 → 报告生成器 的交接对象
///
/// 两部分总是同时存在，构造后不可修改；克隆只增加引用计数。
#[derive(Debug, Clone, PartialEq)]
pub struct ResultHandoff {
    inner: Arc<HandoffInner>,
}

#[derive(Debug, PartialEq)]
struct HandoffInner {
    patient: PatientRecord,
    result: AnalysisResult,
}

impl ResultHandoff {
    pub fn new(patient: PatientRecord, result: AnalysisResult) -> Self {
        Self {
            inner: Arc::new(HandoffInner { patient, result }),
        }
    }

    pub fn patient(&self) -> &PatientRecord {
        &self.inner.patient
    }

    pub fn result(&self) -> &AnalysisResult {
        &self.inner.result
    }
}

impl Display for ResultHandoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[患者 {} 年龄#{} 结果#{} 置信度#{}]",
            self.inner.patient.name,
            self.inner.patient.age,
            self.inner.result.tumor_type,
            self.inner.result.confidence_text()
        )
    }
}
