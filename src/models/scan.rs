//! MRI 图像文件与预览

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::ImageFormat;
use std::path::Path;

use crate::error::SelectionError;

/// 操作员选择的原始文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// 从磁盘读取文件
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// 已选中的图像（由提交控制器独占持有）
///
/// 被新的选择替换或随请求发出时释放。
#[derive(Debug, PartialEq, Eq)]
pub struct ImageSelection {
    file_name: String,
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl ImageSelection {
    /// 校验文件内容为图像
    pub fn from_file(file: ImageFile) -> Result<Self, SelectionError> {
        match image::guess_format(&file.bytes) {
            Ok(format) => Ok(Self {
                file_name: file.file_name,
                format,
                bytes: file.bytes,
            }),
            Err(_) => Err(SelectionError::NotAnImage {
                file_name: file.file_name,
            }),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 预览用的 data URI
    pub fn preview_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }

    /// 转换为上传载荷（所有权移交给请求）
    pub fn into_upload(self) -> ImageUpload {
        ImageUpload {
            mime_type: self.mime_type().to_string(),
            file_name: self.file_name,
            bytes: self.bytes,
        }
    }
}

/// 随 multipart 请求发出的图像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}
