//! # promo-host
//!
//! 推广区域的 headless 模拟器：读取本地数据源和场景文件，
//! 以固定帧率驱动横幅轮播与特价货架，输出最终渲染状态。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p promo-host
//! cargo run -p promo-host -- --feed-dir demo/feed --scenario demo/scenario.json
//! cargo run -p promo-host -- --location downtown --seconds 30 --fps 30
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use promo_host::{
    AppConfig, ClickTracker, FsFeedSource, JsonFileStore, JsonlTracker, LogTracker, Scenario,
    Storefront, TrackingConfig, run_simulation,
};
use promo_runtime::MemoryStore;
use promo_runtime::store::KeyValueStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "promo-host")]
#[command(about = "推广区域 headless 模拟器")]
#[command(version)]
struct Cli {
    /// 配置文件
    #[arg(short, long, default_value = "demo/config.json")]
    config: PathBuf,

    /// 数据源目录（覆盖配置文件）
    #[arg(long)]
    feed_dir: Option<PathBuf>,

    /// 场景文件
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// 模拟时长（秒）
    #[arg(long, default_value_t = 20.0)]
    seconds: f64,

    /// 帧率（覆盖配置文件）
    #[arg(long)]
    fps: Option<u32>,

    /// 门店位置（覆盖配置文件）
    #[arg(short, long)]
    location: Option<String>,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{e:#}");
        eprintln!("promo-host error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 日志级别来自配置文件，订阅器需在正式加载配置前就绪
    let log_level = load_config_quietly(&cli.config).debug.log_level;
    init_tracing(&log_level);
    let mut config = AppConfig::load(&cli.config);

    if let Some(feed_dir) = cli.feed_dir {
        config.feed_dir = feed_dir;
    }
    if let Some(fps) = cli.fps {
        config.fps = fps;
    }
    if cli.location.is_some() {
        config.location = cli.location;
    }
    config.validate()?;

    let duration = simulation_duration(cli.seconds)?;

    let scenario = match &cli.scenario {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("无法加载场景文件 {}", path.display()))?,
        None => Scenario::default(),
    };

    info!(
        feed_dir = ?config.feed_dir,
        location = ?config.location,
        fps = config.fps,
        events = scenario.len(),
        "开始模拟"
    );

    let frame_interval = config.frame_interval();
    let storefront = Storefront::new(
        config.clone(),
        Box::new(FsFeedSource::new(&config.feed_dir)),
        build_tracker(&config.tracking),
        build_store(&config),
    );

    let report = run_simulation(
        storefront,
        scenario,
        duration,
        frame_interval,
    );

    info!(
        frames = report.frames,
        events = report.events,
        slide_changes = report.final_state.slide_changes,
        "模拟结束"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// 模拟时长，拒绝非正数和超出 `Duration` 范围的值
fn simulation_duration(seconds: f64) -> anyhow::Result<Duration> {
    anyhow::ensure!(seconds > 0.0, "--seconds 必须大于 0");
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("--seconds 超出范围: {seconds}"))
}

fn load_config_quietly(path: &std::path::Path) -> AppConfig {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_tracker(config: &TrackingConfig) -> Box<dyn ClickTracker> {
    match config {
        TrackingConfig::Log => Box::new(LogTracker),
        TrackingConfig::Jsonl { path } => Box::new(JsonlTracker::new(path)),
    }
}

fn build_store(config: &AppConfig) -> Box<dyn KeyValueStore> {
    match &config.favorites_path {
        Some(path) => Box::new(JsonFileStore::open(path)),
        None => Box::new(MemoryStore::new()),
    }
}
