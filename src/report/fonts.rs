//! Helvetica 字体度量
//!
//! 报告只使用 PDF 内置的 Helvetica 系列字体（不嵌入字体文件），
//! 居中、右对齐和自动换行都依赖这里的字宽表（AFM，单位 1/1000 em）。

/// 每毫米的点数
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// 行高系数（相对字号）
pub const LINE_HEIGHT_FACTOR: f32 = 1.15;

/// 表外字符使用的字宽
const FALLBACK_WIDTH: u16 = 556;

/// 字体样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
}

impl FontStyle {
    pub const ALL: [FontStyle; 3] = [FontStyle::Normal, FontStyle::Bold, FontStyle::Italic];

    /// PDF 内置字体名
    pub fn base_font(self) -> &'static str {
        match self {
            FontStyle::Normal => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Italic => "Helvetica-Oblique",
        }
    }

    /// 页面资源中的字体名
    pub fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Normal => "F1",
            FontStyle::Bold => "F2",
            FontStyle::Italic => "F3",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            FontStyle::Normal | FontStyle::Italic => &HELVETICA_WIDTHS,
            FontStyle::Bold => &HELVETICA_BOLD_WIDTHS,
        }
    }
}

// 字符 32..=126
#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// 单个字符的字宽（1/1000 em）
pub fn char_width(style: FontStyle, ch: char) -> u16 {
    let code = ch as u32;
    if (32..=126).contains(&code) {
        style.widths()[(code - 32) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

/// 文本宽度（毫米）
pub fn text_width_mm(text: &str, style: FontStyle, size_pt: f32) -> f32 {
    let units: u32 = text.chars().map(|ch| u32::from(char_width(style, ch))).sum();
    units as f32 / 1000.0 * size_pt / PT_PER_MM
}

/// 行距（毫米）
pub fn line_height_mm(size_pt: f32) -> f32 {
    size_pt * LINE_HEIGHT_FACTOR / PT_PER_MM
}

/// 按最大宽度自动换行
///
/// 只在空格处断行；单个单词超宽时独占一行，不拆开。
pub fn wrap_text(text: &str, style: FontStyle, size_pt: f32, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();

        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }

            let candidate = format!("{} {}", current, word);
            if text_width_mm(&candidate, style, size_pt) <= max_width_mm {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }

        lines.push(current);
    }

    lines
}
