use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use mri_report::config::Config;
use mri_report::orchestrator::{AnalysisRequest, App};
use mri_report::utils::logging;

#[derive(Parser)]
#[command(name = "mri-report")]
#[command(about = "Brain MRI tumor analysis and PDF report export")]
struct Cli {
    /// Patient name
    #[arg(long)]
    name: String,
    /// Patient age (positive integer)
    #[arg(long)]
    age: String,
    /// MRI image file
    #[arg(long)]
    image: PathBuf,
    /// Output directory for the PDF report
    #[arg(long)]
    out_dir: Option<String>,
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(cli.config.as_deref()).context("加载配置失败")?;
    if let Some(out_dir) = cli.out_dir {
        config.output_dir = out_dir;
    }

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config);
    let request = AnalysisRequest {
        patient_name: cli.name,
        age: cli.age,
        image_path: cli.image,
    };
    app.run(&request).await?;

    Ok(())
}
