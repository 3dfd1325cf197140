/// 分类服务 API 客户端
///
/// 封装与远程 MRI 分类服务 `/predict` 接口相关的调用逻辑
use crate::config::Config;
use crate::error::ClassifierError;
use crate::models::{AnalysisResult, ImageUpload, PredictResponse};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::future::Future;
use tracing::debug;

/// multipart 中承载图像的字段名
pub const UPLOAD_FIELD: &str = "file";

/// 分类服务能力
///
/// 每次调用只发出一次请求，不做重试。
pub trait Classifier: Send + Sync {
    fn classify(
        &self,
        upload: ImageUpload,
    ) -> impl Future<Output = Result<AnalysisResult, ClassifierError>> + Send;
}

/// 服务端响应：正常预测结果，或推理失败时的 `{"error": ...}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictReply {
    Prediction(PredictResponse),
    Failure { error: String },
}

/// 基于 HTTP 的分类服务客户端
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    /// 创建新的分类服务客户端
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.predict_endpoint(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Classifier for HttpClassifier {
    async fn classify(&self, upload: ImageUpload) -> Result<AnalysisResult, ClassifierError> {
        debug!(
            "POST {} | 文件: {} | 类型: {} | 大小: {} 字节",
            self.endpoint,
            upload.file_name,
            upload.mime_type,
            upload.bytes.len()
        );

        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime_type)
            .map_err(|e| ClassifierError::request_failed(&self.endpoint, e))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClassifierError::request_failed(&self.endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClassifierError::request_failed(&self.endpoint, e))?;

        if !status.is_success() {
            return Err(ClassifierError::BadStatus {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                body,
            });
        }

        debug!("分类服务响应长度: {} 字节", body.len());

        parse_prediction(&self.endpoint, &body)
    }
}

/// 解析 `/predict` 响应体
pub fn parse_prediction(endpoint: &str, body: &str) -> Result<AnalysisResult, ClassifierError> {
    let reply: PredictReply = serde_json::from_str(body)
        .map_err(|e| ClassifierError::malformed(endpoint, format!("JSON解析失败: {}", e)))?;

    match reply {
        PredictReply::Prediction(prediction) => AnalysisResult::from_response(endpoint, prediction),
        PredictReply::Failure { error } => Err(ClassifierError::ServiceError {
            endpoint: endpoint.to_string(),
            message: error,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde_json::json;
    use std::io::Cursor;

    fn jpeg_base64() -> String {
        let img = image::RgbImage::from_pixel(3, 3, image::Rgb([10, 200, 10]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .unwrap();
        STANDARD.encode(buf)
    }

    #[test]
    fn test_parse_prediction_success() {
        let body = json!({
            "tumor_type": "pituitary",
            "confidence": 97.12,
            "heatmap": jpeg_base64(),
        })
        .to_string();

        let result = parse_prediction("http://x/predict", &body).unwrap();
        assert_eq!(result.tumor_type, "pituitary");
        assert_eq!(result.confidence, 97.12);
    }

    #[test]
    fn test_parse_prediction_service_error_body() {
        let body = json!({ "error": "cannot identify image file" }).to_string();

        match parse_prediction("http://x/predict", &body) {
            Err(ClassifierError::ServiceError { message, .. }) => {
                assert_eq!(message, "cannot identify image file");
            }
            other => panic!("应该返回 ServiceError, 实际: {:?}", other),
        }
    }

    #[test]
    fn test_parse_prediction_malformed() {
        for body in ["not json", "{}", r#"{"tumor_type": "glioma"}"#] {
            let err = parse_prediction("http://x/predict", body).unwrap_err();
            assert!(
                matches!(err, ClassifierError::MalformedResponse { .. }),
                "body {:?} 应该是格式错误",
                body
            );
        }
    }

    #[test]
    fn test_endpoint_from_config() {
        let config = Config {
            classifier_base_url: "http://10.0.0.5:8000".to_string(),
            ..Config::default()
        };
        assert_eq!(
            HttpClassifier::new(&config).endpoint(),
            "http://10.0.0.5:8000/predict"
        );
    }
}
