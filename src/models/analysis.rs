//! 分析结果模型
//!
//! 分类服务返回的原始响应 `PredictResponse` 经过校验后转换为 `AnalysisResult`

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::ImageFormat;
use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

/// 热力图的 data URI 前缀（服务端返回的 base64 不带前缀）
pub const HEATMAP_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// 肿瘤分类（模型的固定类别集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TumorClass {
    /// 胶质瘤
    Glioma,
    /// 脑膜瘤
    Meningioma,
    /// 无肿瘤
    NoTumor,
    /// 垂体瘤
    Pituitary,
}

static TUMOR_LABELS: phf::Map<&'static str, TumorClass> = phf_map! {
    "glioma" => TumorClass::Glioma,
    "meningioma" => TumorClass::Meningioma,
    "notumor" => TumorClass::NoTumor,
    "pituitary" => TumorClass::Pituitary,
};

impl TumorClass {
    /// 按标签解析（不区分大小写）
    pub fn from_label(label: &str) -> Option<Self> {
        TUMOR_LABELS.get(label.to_ascii_lowercase().as_str()).copied()
    }

    /// 服务端使用的标准标签
    pub fn label(self) -> &'static str {
        match self {
            TumorClass::Glioma => "glioma",
            TumorClass::Meningioma => "meningioma",
            TumorClass::NoTumor => "notumor",
            TumorClass::Pituitary => "pituitary",
        }
    }
}

/// `/predict` 接口的原始响应体
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub tumor_type: String,
    pub confidence: f64,
    /// base64 编码的 JPEG，不带 data URI 前缀
    pub heatmap: String,
}

/// Grad-CAM 热力图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatmapImage {
    base64: String,
    jpeg: Vec<u8>,
}

impl HeatmapImage {
    /// 从服务端返回的 base64 文本解码
    pub fn from_base64(encoded: &str) -> Result<Self, String> {
        let encoded = encoded.trim();
        let jpeg = STANDARD
            .decode(encoded)
            .map_err(|e| format!("热力图 base64 解码失败: {}", e))?;

        match image::guess_format(&jpeg) {
            Ok(ImageFormat::Jpeg) => Ok(Self {
                base64: encoded.to_string(),
                jpeg,
            }),
            Ok(other) => Err(format!("热力图应为 JPEG，实际为 {:?}", other)),
            Err(_) => Err("热力图不是可识别的图像".to_string()),
        }
    }

    /// 从 JPEG 字节创建
    pub fn from_jpeg(jpeg: Vec<u8>) -> Self {
        Self {
            base64: STANDARD.encode(&jpeg),
            jpeg,
        }
    }

    /// JPEG 原始字节
    pub fn jpeg_bytes(&self) -> &[u8] {
        &self.jpeg
    }

    /// 可直接显示的 data URI
    pub fn data_uri(&self) -> String {
        format!("{}{}", HEATMAP_DATA_URI_PREFIX, self.base64)
    }
}

/// 一次成功提交的分析结果
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// 服务端返回的原始标签（保留大小写，诊断格式化规则基于它）
    pub tumor_type: String,
    /// 置信度（0 - 100）
    pub confidence: f64,
    /// 热力图
    pub heatmap: HeatmapImage,
}

impl AnalysisResult {
    /// 校验并转换服务端响应
    pub fn from_response(
        endpoint: &str,
        response: PredictResponse,
    ) -> Result<Self, ClassifierError> {
        if TumorClass::from_label(&response.tumor_type).is_none() {
            return Err(ClassifierError::malformed(
                endpoint,
                format!("未知的肿瘤类型: {}", response.tumor_type),
            ));
        }

        if !response.confidence.is_finite() || !(0.0..=100.0).contains(&response.confidence) {
            return Err(ClassifierError::malformed(
                endpoint,
                format!("置信度超出范围 [0, 100]: {}", response.confidence),
            ));
        }

        let heatmap = HeatmapImage::from_base64(&response.heatmap)
            .map_err(|reason| ClassifierError::malformed(endpoint, reason))?;

        Ok(Self {
            tumor_type: response.tumor_type,
            confidence: response.confidence,
            heatmap,
        })
    }

    /// 解析后的肿瘤分类
    pub fn tumor_class(&self) -> Option<TumorClass> {
        TumorClass::from_label(&self.tumor_type)
    }

    /// 置信度文本，如 `92.35%`
    pub fn confidence_text(&self) -> String {
        format!("{}%", self.confidence)
    }
}
