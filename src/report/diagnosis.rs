//! 诊断文字格式化

/// 表示"无肿瘤"的标签
pub const NO_TUMOR_SENTINEL: &str = "notumor";

/// "无肿瘤"的显示文字
pub const NO_TUMOR_LABEL: &str = "No Tumor Detected";

/// 把原始标签转换为显示用的诊断文字
///
/// - `notumor`（不区分大小写）显示为 `No Tumor Detected`
/// - 其它标签只把首字母大写，其余保持原样（`MENINGIOMA` 仍是 `MENINGIOMA`）
pub fn format_diagnosis(raw: &str) -> String {
    if raw.eq_ignore_ascii_case(NO_TUMOR_SENTINEL) {
        return NO_TUMOR_LABEL.to_string();
    }

    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
