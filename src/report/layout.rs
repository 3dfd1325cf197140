//! 报告页面布局
//!
//! A4 纵向页面，坐标单位为毫米，原点在左上角，文字的 y 是基线位置。
//! `render_at` 是纯函数：相同的输入和时间戳总是得到相同的元素列表。

use chrono::{DateTime, Local, Utc};
use std::fmt::Display;

use crate::error::ReportError;
use crate::models::{AnalysisResult, HeatmapImage, PatientRecord};
use crate::report::diagnosis::format_diagnosis;
use crate::report::fonts::{line_height_mm, text_width_mm, wrap_text, FontStyle};
use crate::workflow::ResultHandoff;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;

pub const REPORT_TITLE: &str = "Brain Tumor Detection Report";
pub const NOT_AVAILABLE: &str = "N/A";
pub const DISCLAIMER: &str = "Disclaimer: This AI system assists medical professionals and is not a substitute for clinical diagnosis. Final interpretation should be performed by a qualified medical practitioner.";

const HEATMAP_WIDTH_MM: f32 = 140.0;
const HEATMAP_HEIGHT_MM: f32 = 100.0;
const HEATMAP_TOP_MM: f32 = 170.0;

/// 报告编号，格式 `RPT-<毫秒时间戳>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportId(String);

impl ReportId {
    pub fn from_millis(millis: i64) -> Self {
        Self(format!("RPT-{}", millis))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 一次渲染使用的两个时间戳（编号种子时间、生成时间），渲染开始时各取一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStamp {
    pub report_id: ReportId,
    pub generated_on: DateTime<Local>,
}

impl ReportStamp {
    pub fn new(report_id: ReportId, generated_on: DateTime<Local>) -> Self {
        Self {
            report_id,
            generated_on,
        }
    }

    /// 读取当前时间
    pub fn capture() -> Self {
        let report_id = ReportId::from_millis(Utc::now().timestamp_millis());
        let generated_on = Local::now();
        Self::new(report_id, generated_on)
    }

    /// 本地化的生成时间，如 `3/5/2026, 2:07:09 PM`
    pub fn generated_on_text(&self) -> String {
        self.generated_on
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string()
    }
}

/// 文字对齐方式（相对锚点 x）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// 含时间戳的文字元素
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampField {
    ReportId,
    GeneratedOn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub style: FontStyle,
    pub align: Align,
    pub stamp: Option<StampField>,
}

impl TextBlock {
    pub fn width_mm(&self) -> f32 {
        text_width_mm(&self.text, self.style, self.size)
    }

    /// 对齐后的左边缘
    pub fn left_x(&self) -> f32 {
        match self.align {
            Align::Left => self.x,
            Align::Center => self.x - self.width_mm() / 2.0,
            Align::Right => self.x - self.width_mm(),
        }
    }
}

/// 水平分隔线
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub line_width: f32,
}

/// 固定尺寸的图像区域（y 为上边缘）
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub jpeg: HeatmapImage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(TextBlock),
    Rule(Rule),
    Image(ImagePlacement),
}

/// 渲染好的单页报告
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    stamp: ReportStamp,
    elements: Vec<Element>,
}

impl ReportDocument {
    pub fn report_id(&self) -> &ReportId {
        &self.stamp.report_id
    }

    pub fn stamp(&self) -> &ReportStamp {
        &self.stamp
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// 建议的导出文件名，与元信息行使用同一个编号
    pub fn suggested_filename(&self) -> String {
        format!("MRI_Report_{}.pdf", self.stamp.report_id)
    }

    /// 所有文字元素
    pub fn text_blocks(&self) -> impl Iterator<Item = &TextBlock> {
        self.elements.iter().filter_map(|element| match element {
            Element::Text(block) => Some(block),
            _ => None,
        })
    }

    /// 按前缀查找第一条文字
    pub fn find_text(&self, prefix: &str) -> Option<&TextBlock> {
        self.text_blocks().find(|block| block.text.starts_with(prefix))
    }
}

/// 使用当前时间渲染报告
///
/// # 参数
/// - `patient`: 患者信息（缺失时姓名、年龄显示 N/A）
/// - `result`: 分析结果（缺失时返回 `MissingResult`，不生成任何文档）
pub fn render(
    patient: Option<&PatientRecord>,
    result: Option<&AnalysisResult>,
) -> Result<ReportDocument, ReportError> {
    render_at(patient, result, ReportStamp::capture())
}

/// 从交接对象渲染报告
pub fn render_handoff(handoff: &ResultHandoff) -> Result<ReportDocument, ReportError> {
    render(Some(handoff.patient()), Some(handoff.result()))
}

/// 使用指定时间戳渲染报告
pub fn render_at(
    patient: Option<&PatientRecord>,
    result: Option<&AnalysisResult>,
    stamp: ReportStamp,
) -> Result<ReportDocument, ReportError> {
    let result = result.ok_or(ReportError::MissingResult)?;

    let center = PAGE_WIDTH_MM / 2.0;
    let right = PAGE_WIDTH_MM - MARGIN_MM;
    let mut page = PageBuilder::default();

    // ===== 标题 =====
    page.text(REPORT_TITLE, center, 20.0, 20.0, FontStyle::Bold, Align::Center);
    page.rule(25.0, 0.5);

    // ===== 元信息 =====
    page.stamped(
        format!("Report ID: {}", stamp.report_id),
        MARGIN_MM,
        Align::Left,
        StampField::ReportId,
    );
    page.stamped(
        format!("Generated On: {}", stamp.generated_on_text()),
        right,
        Align::Right,
        StampField::GeneratedOn,
    );

    // ===== 患者信息 =====
    page.text("Patient Information", MARGIN_MM, 50.0, 14.0, FontStyle::Bold, Align::Left);
    page.text(
        format!("Patient Name: {}", patient_name(patient)),
        25.0,
        60.0,
        12.0,
        FontStyle::Normal,
        Align::Left,
    );
    page.text(
        format!("Age: {}", patient_age(patient)),
        25.0,
        70.0,
        12.0,
        FontStyle::Normal,
        Align::Left,
    );

    // ===== 诊断摘要 =====
    page.text("Diagnostic Summary", MARGIN_MM, 90.0, 15.0, FontStyle::Bold, Align::Left);
    page.rule(95.0, 0.3);
    page.text("Primary Finding:", 25.0, 110.0, 11.0, FontStyle::Normal, Align::Left);
    page.text(
        format_diagnosis(&result.tumor_type),
        center,
        125.0,
        18.0,
        FontStyle::Bold,
        Align::Center,
    );
    page.text(
        format!("Model Confidence Score: {}", result.confidence_text()),
        center,
        140.0,
        11.0,
        FontStyle::Normal,
        Align::Center,
    );

    // ===== 热力图 =====
    page.text("Grad-CAM Visualization", MARGIN_MM, 160.0, 14.0, FontStyle::Bold, Align::Left);
    page.elements.push(Element::Image(ImagePlacement {
        x: (PAGE_WIDTH_MM - HEATMAP_WIDTH_MM) / 2.0,
        y: HEATMAP_TOP_MM,
        width: HEATMAP_WIDTH_MM,
        height: HEATMAP_HEIGHT_MM,
        jpeg: result.heatmap.clone(),
    }));

    // ===== 免责声明 =====
    let disclaimer_size = 9.0;
    let lines = wrap_text(
        DISCLAIMER,
        FontStyle::Italic,
        disclaimer_size,
        PAGE_WIDTH_MM - 2.0 * MARGIN_MM,
    );
    let first_baseline = PAGE_HEIGHT_MM - MARGIN_MM;
    for (i, line) in lines.into_iter().enumerate() {
        page.text(
            line,
            MARGIN_MM,
            first_baseline + i as f32 * line_height_mm(disclaimer_size),
            disclaimer_size,
            FontStyle::Italic,
            Align::Left,
        );
    }

    Ok(ReportDocument {
        stamp,
        elements: page.elements,
    })
}

fn patient_name(patient: Option<&PatientRecord>) -> &str {
    patient
        .map(|p| p.name.as_str())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(NOT_AVAILABLE)
}

fn patient_age(patient: Option<&PatientRecord>) -> String {
    patient
        .map(|p| p.age)
        .filter(|age| *age > 0)
        .map(|age| age.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[derive(Default)]
struct PageBuilder {
    elements: Vec<Element>,
}

impl PageBuilder {
    fn text(
        &mut self,
        text: impl Into<String>,
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        align: Align,
    ) {
        self.elements.push(Element::Text(TextBlock {
            text: text.into(),
            x,
            y,
            size,
            style,
            align,
            stamp: None,
        }));
    }

    /// 元信息行（y=35，10pt）
    fn stamped(&mut self, text: String, x: f32, align: Align, field: StampField) {
        self.elements.push(Element::Text(TextBlock {
            text,
            x,
            y: 35.0,
            size: 10.0,
            style: FontStyle::Normal,
            align,
            stamp: Some(field),
        }));
    }

    /// 左右页边距之间的横线
    fn rule(&mut self, y: f32, line_width: f32) {
        self.elements.push(Element::Rule(Rule {
            x1: MARGIN_MM,
            x2: PAGE_WIDTH_MM - MARGIN_MM,
            y,
            line_width,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn result(tumor_type: &str) -> AnalysisResult {
        AnalysisResult {
            tumor_type: tumor_type.to_string(),
            confidence: 92.35,
            heatmap: HeatmapImage::from_jpeg(vec![0xFF, 0xD8, 0xFF, 0xDB]),
        }
    }

    fn patient() -> PatientRecord {
        PatientRecord {
            name: "Grace Hopper".to_string(),
            age: 58,
        }
    }

    fn stamp(millis: i64, hour: u32) -> ReportStamp {
        ReportStamp::new(
            ReportId::from_millis(millis),
            Local.with_ymd_and_hms(2026, 3, 5, hour, 7, 9).single().unwrap(),
        )
    }

    #[test]
    fn test_report_id_matches_filename() {
        let doc = render(Some(&patient()), Some(&result("glioma"))).unwrap();
        let id = doc.report_id().to_string();

        assert!(id.starts_with("RPT-"));
        assert!(id["RPT-".len()..].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(
            doc.find_text("Report ID: ").unwrap().text,
            format!("Report ID: {}", id)
        );
        assert_eq!(doc.suggested_filename(), format!("MRI_Report_{}.pdf", id));
    }

    #[test]
    fn test_missing_result_is_precondition_error() {
        let err = render(Some(&patient()), None).unwrap_err();
        assert_eq!(err, ReportError::MissingResult);
    }

    #[test]
    fn test_missing_patient_fields_render_na_independently() {
        let no_name = PatientRecord {
            name: String::new(),
            age: 40,
        };
        let doc = render_at(Some(&no_name), Some(&result("glioma")), stamp(1, 9)).unwrap();
        assert_eq!(doc.find_text("Patient Name:").unwrap().text, "Patient Name: N/A");
        assert_eq!(doc.find_text("Age:").unwrap().text, "Age: 40");

        let no_age = PatientRecord {
            name: "Alan".to_string(),
            age: 0,
        };
        let doc = render_at(Some(&no_age), Some(&result("glioma")), stamp(1, 9)).unwrap();
        assert_eq!(doc.find_text("Patient Name:").unwrap().text, "Patient Name: Alan");
        assert_eq!(doc.find_text("Age:").unwrap().text, "Age: N/A");

        let doc = render_at(None, Some(&result("glioma")), stamp(1, 9)).unwrap();
        assert_eq!(doc.find_text("Patient Name:").unwrap().text, "Patient Name: N/A");
        assert_eq!(doc.find_text("Age:").unwrap().text, "Age: N/A");
    }

    #[test]
    fn test_renders_differ_only_in_stamps() {
        let first = render_at(
            Some(&patient()),
            Some(&result("notumor")),
            stamp(1_700_000_000_000, 9),
        )
        .unwrap();
        let second = render_at(
            Some(&patient()),
            Some(&result("notumor")),
            stamp(1_700_000_123_456, 16),
        )
        .unwrap();

        assert_eq!(first.elements().len(), second.elements().len());
        let mut differing = Vec::new();
        for (a, b) in first.elements().iter().zip(second.elements()) {
            if a != b {
                match (a, b) {
                    (Element::Text(a), Element::Text(b)) => {
                        assert_eq!(a.stamp, b.stamp);
                        differing.push(a.stamp.expect("只有时间戳元素可以不同"));
                    }
                    _ => panic!("非文字元素不应不同: {:?} vs {:?}", a, b),
                }
            }
        }
        assert_eq!(differing, vec![StampField::ReportId, StampField::GeneratedOn]);

        let again = render_at(
            Some(&patient()),
            Some(&result("notumor")),
            stamp(1_700_000_000_000, 9),
        )
        .unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_fixed_positions() {
        let doc = render_at(Some(&patient()), Some(&result("MENINGIOMA")), stamp(42, 14)).unwrap();

        let title = doc.find_text(REPORT_TITLE).unwrap();
        assert_eq!((title.x, title.y, title.size), (105.0, 20.0, 20.0));
        assert_eq!(title.align, Align::Center);
        assert!((title.left_x() + title.width_mm() / 2.0 - 105.0).abs() < 1e-3);

        let generated = doc.find_text("Generated On: ").unwrap();
        assert_eq!(generated.text, "Generated On: 3/5/2026, 2:07:09 PM");
        assert_eq!((generated.x, generated.y), (190.0, 35.0));
        assert!((generated.left_x() + generated.width_mm() - 190.0).abs() < 1e-3);

        let diagnosis = doc.find_text("MENINGIOMA").unwrap();
        assert_eq!((diagnosis.x, diagnosis.y, diagnosis.size), (105.0, 125.0, 18.0));
        assert_eq!(diagnosis.style, FontStyle::Bold);

        let confidence = doc.find_text("Model Confidence Score:").unwrap();
        assert_eq!(confidence.text, "Model Confidence Score: 92.35%");
        assert_eq!((confidence.x, confidence.y), (105.0, 140.0));

        let rules: Vec<&Rule> = doc
            .elements()
            .iter()
            .filter_map(|e| match e {
                Element::Rule(rule) => Some(rule),
                _ => None,
            })
            .collect();
        assert_eq!(rules.len(), 2);
        assert_eq!(
            (rules[0].x1, rules[0].x2, rules[0].y, rules[0].line_width),
            (20.0, 190.0, 25.0, 0.5)
        );
        assert_eq!((rules[1].y, rules[1].line_width), (95.0, 0.3));

        let image = doc
            .elements()
            .iter()
            .find_map(|e| match e {
                Element::Image(image) => Some(image),
                _ => None,
            })
            .unwrap();
        assert_eq!((image.x, image.y, image.width, image.height), (35.0, 170.0, 140.0, 100.0));
    }

    #[test]
    fn test_disclaimer_wrapped_near_bottom() {
        let doc = render_at(Some(&patient()), Some(&result("glioma")), stamp(7, 9)).unwrap();
        let lines: Vec<&TextBlock> = doc
            .text_blocks()
            .filter(|b| b.style == FontStyle::Italic)
            .collect();

        assert!(lines.len() >= 2);
        assert_eq!(lines[0].y, 277.0);
        assert!(lines[0].text.starts_with("Disclaimer:"));
        for line in &lines {
            assert!(line.width_mm() <= 170.0);
            assert!(line.y < PAGE_HEIGHT_MM);
        }
        let joined: Vec<&str> = lines.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(joined.join(" "), DISCLAIMER);
    }

    #[test]
    fn test_generated_on_format() {
        assert_eq!(stamp(1, 9).generated_on_text(), "3/5/2026, 9:07:09 AM");
        assert_eq!(stamp(1, 0).generated_on_text(), "3/5/2026, 12:07:09 AM");
    }
}
