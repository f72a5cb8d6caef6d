use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lane_lines::{video, LaneConfig};

/// 주행 영상에 좌/우 차선을 합성합니다.
#[derive(Parser)]
#[command(name = "lane_lines")]
#[command(about = "Detect and overlay smoothed left/right lane lines on a video")]
struct Args {
    /// 입력 영상
    #[arg(short, long)]
    input: PathBuf,

    /// 출력 영상 (mp4)
    #[arg(short, long)]
    output: PathBuf,

    /// YAML 설정 파일 (없으면 기본값)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 로그 필터 (예: "lane_lines=debug")
    #[arg(long, default_value = "lane_lines=info")]
    log: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log)))
        .init();

    let config = match &args.config {
        Some(path) => LaneConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LaneConfig::default(),
    };
    info!(
        window = config.smoothing.window_capacity,
        y_far_ratio = config.projection.y_far_ratio,
        "configuration loaded"
    );

    let stats = video::process_video(&args.input, &args.output, &config)
        .with_context(|| format!("processing {}", args.input.display()))?;
    info!("done: {} frames", stats.frames);

    Ok(())
}
