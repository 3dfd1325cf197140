use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// 患者信息
///
/// 在提交时由表单输入创建，之后不再修改，只在本次会话中存在。
/// 字段保持公开：报告生成时空姓名 / 年龄为 0 会显示为 "N/A"。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// 患者姓名
    pub name: String,
    /// 年龄（正整数）
    pub age: u32,
}

impl PatientRecord {
    /// 从表单输入创建患者信息
    ///
    /// # 参数
    /// - `name`: 姓名输入框内容
    /// - `age_input`: 年龄输入框内容（数字输入框的原始文本）
    pub fn from_form(name: &str, age_input: &str) -> Result<Self, ValidationError> {
        let record = Self {
            name: name.trim().to_string(),
            age: parse_age(age_input)?,
        };
        record.validate()?;
        Ok(record)
    }

    /// 校验姓名非空、年龄为正整数
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.age == 0 {
            return Err(ValidationError::InvalidAge {
                input: self.age.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_age(input: &str) -> Result<u32, ValidationError> {
    match input.trim().parse::<u32>() {
        Ok(age) if age > 0 => Ok(age),
        _ => Err(ValidationError::InvalidAge {
            input: input.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_form_trims_name() {
        let record = PatientRecord::from_form("  Jane Doe ", "42").unwrap();
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.age, 42);
    }

    #[test]
    fn test_from_form_rejects_empty_name() {
        assert_eq!(
            PatientRecord::from_form("   ", "42"),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn test_from_form_rejects_bad_age() {
        for input in ["0", "-3", "4.5", "", "abc"] {
            assert_eq!(
                PatientRecord::from_form("Jane", input),
                Err(ValidationError::InvalidAge {
                    input: input.to_string()
                }),
                "输入 {:?} 应该被拒绝",
                input
            );
        }
    }

    #[test]
    fn test_validate_constructed_record() {
        let record = PatientRecord {
            name: String::new(),
            age: 30,
        };
        assert_eq!(record.validate(), Err(ValidationError::EmptyName));
    }
}
