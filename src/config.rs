use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 分类服务地址（不含 /predict）
    pub classifier_base_url: String,
    /// PDF 报告输出目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier_base_url: "http://127.0.0.1:8000".to_string(),
            output_dir: "reports".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 默认配置 + 环境变量覆盖
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::ParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 加载配置：先读文件（可选），再用环境变量覆盖
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Ok(Self::from_toml_file(p)?.with_env_overrides()),
            None => Ok(Self::from_env()),
        }
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            classifier_base_url: lookup("CLASSIFIER_BASE_URL").unwrap_or(self.classifier_base_url),
            output_dir: lookup("REPORT_OUTPUT_DIR").unwrap_or(self.output_dir),
            verbose_logging: lookup("VERBOSE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.verbose_logging),
        }
    }

    /// 预测接口的完整地址
    pub fn predict_endpoint(&self) -> String {
        format!("{}/predict", self.classifier_base_url.trim_end_matches('/'))
    }
}
