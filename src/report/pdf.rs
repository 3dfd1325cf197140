//! PDF 编码
//!
//! 把 `ReportDocument` 的元素列表写成单页 PDF：
//! 内置 Helvetica 字体（不嵌入）、JPEG 热力图直接以 DCTDecode 嵌入、内容流不压缩。

use std::io::Cursor;

use image::codecs::jpeg::JpegDecoder;
use image::ImageDecoder;
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::error::ReportError;
use crate::report::fonts::{FontStyle, PT_PER_MM};
use crate::report::layout::{
    Element, ImagePlacement, ReportDocument, Rule, TextBlock, PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
};

const CATALOG_ID: Ref = Ref::new(1);
const PAGE_TREE_ID: Ref = Ref::new(2);
const PAGE_ID: Ref = Ref::new(3);
const CONTENT_ID: Ref = Ref::new(4);
const FIRST_FONT_ID: i32 = 5;

impl ReportDocument {
    /// 编码为 PDF 字节
    pub fn to_pdf(&self) -> Result<Vec<u8>, ReportError> {
        encode(self)
    }
}

fn font_ref(style: FontStyle) -> Ref {
    let offset = match style {
        FontStyle::Normal => 0,
        FontStyle::Bold => 1,
        FontStyle::Italic => 2,
    };
    Ref::new(FIRST_FONT_ID + offset)
}

fn image_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

/// 毫米 → 点
fn pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// 自上而下的毫米坐标 → PDF 自下而上的点坐标
fn pt_from_top(y_mm: f32) -> f32 {
    pt(PAGE_HEIGHT_MM - y_mm)
}

/// 转换为 WinAnsi 字节，无法表示的字符替换为 `?`
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => b'?',
        })
        .collect()
}

/// 读取 JPEG 帧头（SOF）中的通道数
///
/// DCTDecode 直接嵌入原始数据，颜色空间必须与帧头一致。
fn sof_components(jpeg: &[u8]) -> Option<u8> {
    if !jpeg.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= jpeg.len() {
        if jpeg[pos] != 0xFF {
            return None;
        }
        let marker = jpeg[pos + 1];
        match marker {
            // 填充字节
            0xFF => pos += 1,
            // 无长度字段的标记
            0x01 | 0xD0..=0xD7 => pos += 2,
            // SOS 之前没有帧头
            0xDA => return None,
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                return jpeg.get(pos + 9).copied();
            }
            _ => {
                let length = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
                pos += 2 + length;
            }
        }
    }
    None
}

pub fn encode(doc: &ReportDocument) -> Result<Vec<u8>, ReportError> {
    let images: Vec<&ImagePlacement> = doc
        .elements()
        .iter()
        .filter_map(|element| match element {
            Element::Image(image) => Some(image),
            _ => None,
        })
        .collect();
    let image_names: Vec<String> = (0..images.len()).map(image_name).collect();
    let first_image_id = FIRST_FONT_ID + FontStyle::ALL.len() as i32;
    let image_ref = |index: usize| Ref::new(first_image_id + index as i32);

    let mut pdf = Pdf::new();
    pdf.catalog(CATALOG_ID).pages(PAGE_TREE_ID);
    pdf.pages(PAGE_TREE_ID).kids([PAGE_ID]).count(1);

    {
        let mut page = pdf.page(PAGE_ID);
        page.media_box(Rect::new(0.0, 0.0, pt(PAGE_WIDTH_MM), pt(PAGE_HEIGHT_MM)));
        page.parent(PAGE_TREE_ID);
        page.contents(CONTENT_ID);

        let mut resources = page.resources();
        {
            let mut fonts = resources.fonts();
            for style in FontStyle::ALL {
                fonts.pair(Name(style.resource_name().as_bytes()), font_ref(style));
            }
        }
        {
            let mut x_objects = resources.x_objects();
            for (index, name) in image_names.iter().enumerate() {
                x_objects.pair(Name(name.as_bytes()), image_ref(index));
            }
        }
    }

    for style in FontStyle::ALL {
        pdf.type1_font(font_ref(style))
            .base_font(Name(style.base_font().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (index, placement) in images.iter().enumerate() {
        let jpeg = placement.jpeg.jpeg_bytes();
        let components = sof_components(jpeg)
            .ok_or_else(|| ReportError::encoding("热力图缺少 SOF 帧头"))?;
        if components != 1 && components != 3 {
            return Err(ReportError::encoding(format!(
                "热力图应为灰度或 RGB JPEG，实际通道数: {}",
                components
            )));
        }
        let decoder = JpegDecoder::new(Cursor::new(jpeg)).map_err(ReportError::encoding)?;
        let (width, height) = decoder.dimensions();

        let mut xobject = pdf.image_xobject(image_ref(index), jpeg);
        xobject.filter(Filter::DctDecode);
        xobject.width(width as i32);
        xobject.height(height as i32);
        if components == 1 {
            xobject.color_space().device_gray();
        } else {
            xobject.color_space().device_rgb();
        }
        xobject.bits_per_component(8);
    }

    let mut content = Content::new();
    let mut image_index = 0;
    for element in doc.elements() {
        match element {
            Element::Text(block) => write_text(&mut content, block),
            Element::Rule(rule) => write_rule(&mut content, rule),
            Element::Image(placement) => {
                write_image(&mut content, placement, &image_names[image_index]);
                image_index += 1;
            }
        }
    }
    pdf.stream(CONTENT_ID, &content.finish());

    Ok(pdf.finish())
}

fn write_text(content: &mut Content, block: &TextBlock) {
    content.begin_text();
    content.set_font(Name(block.style.resource_name().as_bytes()), block.size);
    content.next_line(pt(block.left_x()), pt_from_top(block.y));
    content.show(Str(&win_ansi(&block.text)));
    content.end_text();
}

fn write_rule(content: &mut Content, rule: &Rule) {
    let y = pt_from_top(rule.y);
    content.set_line_width(pt(rule.line_width));
    content.move_to(pt(rule.x1), y);
    content.line_to(pt(rule.x2), y);
    content.stroke();
}

fn write_image(content: &mut Content, placement: &ImagePlacement, name: &str) {
    content.save_state();
    content.transform([
        pt(placement.width),
        0.0,
        0.0,
        pt(placement.height),
        pt(placement.x),
        pt_from_top(placement.y + placement.height),
    ]);
    content.x_object(Name(name.as_bytes()));
    content.restore_state();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResult, HeatmapImage, PatientRecord};
    use crate::report::layout::{render_at, ReportId, ReportStamp};
    use chrono::{Local, TimeZone};

    fn jpeg() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(8, 6, image::Rgb([255, 128, 0]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    fn document(heatmap: Vec<u8>) -> ReportDocument {
        let result = AnalysisResult {
            tumor_type: "pituitary".to_string(),
            confidence: 99.1,
            heatmap: HeatmapImage::from_jpeg(heatmap),
        };
        let patient = PatientRecord {
            name: "Rosalind Franklin".to_string(),
            age: 37,
        };
        let stamp = ReportStamp::new(
            ReportId::from_millis(1_767_225_600_000),
            Local.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).single().unwrap(),
        );
        render_at(Some(&patient), Some(&result), stamp).unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_encode_single_page_pdf() {
        let bytes = document(jpeg()).to_pdf().unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"(Report ID: RPT-1767225600000)"));
        assert!(contains(&bytes, b"(Patient Name: Rosalind Franklin)"));
        assert!(contains(&bytes, b"(Pituitary)"));
        assert!(contains(&bytes, b"/Count 1"));
        assert!(contains(&bytes, b"/DCTDecode"));
        assert!(contains(&bytes, b"/Helvetica-Bold"));
        assert!(contains(&bytes, b"/Helvetica-Oblique"));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let doc = document(jpeg());
        assert_eq!(doc.to_pdf().unwrap(), doc.to_pdf().unwrap());
    }

    #[test]
    fn test_encode_rejects_invalid_jpeg() {
        let err = document(vec![0x00, 0x01, 0x02]).to_pdf().unwrap_err();
        assert!(matches!(err, ReportError::Encoding { .. }));
    }

    #[test]
    fn test_sof_components() {
        assert_eq!(sof_components(&jpeg()), Some(3));

        let gray = image::GrayImage::from_pixel(4, 4, image::Luma([90]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageLuma8(gray)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .unwrap();
        assert_eq!(sof_components(&buf), Some(1));

        assert_eq!(sof_components(&[0x89, b'P', b'N', b'G']), None);
    }

    #[test]
    fn test_encode_rejects_cmyk_jpeg() {
        // SOI + SOF0（16x16，4 通道）
        let mut cmyk = vec![
            0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x14, 0x08, 0x00, 0x10, 0x00, 0x10, 0x04,
        ];
        for id in 1..=4 {
            cmyk.extend_from_slice(&[id, 0x11, 0x00]);
        }
        assert_eq!(sof_components(&cmyk), Some(4));

        let err = document(cmyk).to_pdf().unwrap_err();
        match err {
            ReportError::Encoding { reason } => assert!(reason.contains("4")),
            other => panic!("意外的错误: {:?}", other),
        }
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi("Zoë"), b"Zo\xEB".to_vec());
        assert_eq!(win_ansi("王"), b"?".to_vec());
    }
}
