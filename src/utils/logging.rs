/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::models::PatientRecord;
use crate::report::ResultView;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。
/// 重复调用不会报错（测试中多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - MRI 脑肿瘤分析报告");
    info!("🌐 分类服务: {}", config.predict_endpoint());
    info!("📁 报告目录: {}", config.output_dir);
    info!("{}", "=".repeat(60));
}

/// 记录一次提交
pub fn log_submission(patient: &PatientRecord, file_name: &str) {
    info!("\n{}", "─".repeat(60));
    info!("🧠 提交分析: {} ({} 岁)", truncate_text(&patient.name, 30), patient.age);
    info!("🖼️ 影像文件: {}", file_name);
    info!("{}", "─".repeat(60));
}

/// 打印结果摘要
pub fn log_summary(view: &ResultView) {
    info!("\n{}", "=".repeat(60));
    for line in view.to_string().lines() {
        info!("{}", line);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("abcdefgh", 3), "abc...");
        assert_eq!(truncate_text("脑部影像分析", 2), "脑部...");
    }

    #[test]
    fn test_init_twice() {
        init(false);
        init(true);
    }
}
