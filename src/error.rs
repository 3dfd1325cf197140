use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 表单输入校验错误（不会发出任何请求）
    #[error("输入校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 文件选择错误
    #[error("文件选择错误: {0}")]
    Selection(#[from] SelectionError),
    /// 提交流程错误
    #[error("提交流程错误: {0}")]
    Submission(#[from] SubmissionError),
    /// 分类服务调用错误
    #[error("分类服务错误: {0}")]
    Classifier(#[from] ClassifierError),
    /// 报告生成错误
    #[error("报告错误: {0}")]
    Report(#[from] ReportError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 表单输入校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// 未选择 MRI 图像
    #[error("请先选择 MRI 图像")]
    MissingFile,
    /// 患者姓名为空
    #[error("患者姓名不能为空")]
    EmptyName,
    /// 年龄不是正整数
    #[error("年龄必须是正整数: '{input}'")]
    InvalidAge { input: String },
}

/// 文件选择错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// 文件内容不是可识别的图像
    #[error("文件 {file_name} 不是可识别的图像格式")]
    NotAnImage { file_name: String },
}

/// 提交流程错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// 已有一个提交正在进行
    #[error("已有分析任务正在进行，请等待完成")]
    Busy,
}

/// 分类服务调用错误
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务返回非 2xx 状态码
    #[error("服务返回错误状态 ({endpoint}): HTTP {status}, body={body}")]
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 响应体格式不正确
    #[error("响应格式错误 ({endpoint}): {reason}")]
    MalformedResponse { endpoint: String, reason: String },
    /// 服务在响应体中报告了推理错误
    #[error("分类服务报告错误 ({endpoint}): {message}")]
    ServiceError { endpoint: String, message: String },
    /// 请求任务被取消
    #[error("分析任务已取消")]
    Cancelled,
    /// 请求任务异常退出
    #[error("分析任务异常退出: {0}")]
    TaskFailed(String),
}

/// 报告生成错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// 没有可用的分析结果
    #[error("没有可用的分析结果，无法生成报告")]
    MissingResult,
    /// PDF 编码失败
    #[error("报告编码失败: {reason}")]
    Encoding { reason: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 解析配置文件失败
    #[error("解析配置文件失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl ClassifierError {
    /// 创建请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        ClassifierError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 创建响应格式错误
    pub fn malformed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        ClassifierError::MalformedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

impl ReportError {
    /// 创建编码错误
    pub fn encoding(reason: impl std::fmt::Display) -> Self {
        ReportError::Encoding {
            reason: reason.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
