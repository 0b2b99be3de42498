//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 promo-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `feed-check`: 检查数据源文件（解析、重复 ID、媒体路径）

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use promo_runtime::{
    CarouselItem, ItemId, MediaHint, MediaKind, MediaRef, MediaResolver, PromotionalItem,
    parse_feed,
};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "开发辅助工具")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行 fmt、clippy、test 门禁检查
    CheckAll,
    /// 运行 promo-runtime 覆盖率报告
    CovRuntime,
    /// 运行 workspace 覆盖率报告
    CovWorkspace,
    /// 检查数据源文件
    ///
    /// 不带参数时检查 demo/feed/ 下所有 .json 文件。
    FeedCheck {
        /// 文件或目录
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    match cli.command {
        Commands::CheckAll => {
            step("cargo fmt --all -- --check");
            cmd!(sh, "cargo fmt --all -- --check").run()?;

            step("cargo clippy --workspace --all-targets");
            cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

            step("cargo test --workspace");
            cmd!(sh, "cargo test --workspace").run()?;
        }
        Commands::CovRuntime => {
            ensure_cargo_llvm_cov_available(&sh)?;

            step("cargo llvm-cov -p promo-runtime --html");
            cmd!(sh, "cargo llvm-cov -p promo-runtime --html").run()?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Commands::CovWorkspace => {
            ensure_cargo_llvm_cov_available(&sh)?;

            // 排除 xtask 以免稀释信号
            step("cargo llvm-cov --workspace --exclude xtask --html");
            cmd!(sh, "cargo llvm-cov --workspace --exclude xtask --html").run()?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Commands::FeedCheck { path } => feed_check(path.as_deref())?,
    }

    Ok(())
}

fn step(name: &str) {
    eprintln!("\n==> {name}");
}

fn ensure_cargo_llvm_cov_available(sh: &Shell) -> anyhow::Result<()> {
    if cmd!(sh, "cargo llvm-cov --version").quiet().run().is_err() {
        anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        );
    }
    Ok(())
}

//=============================================================================
// feed-check 命令实现
//=============================================================================

/// 默认数据源目录（相对于 workspace root）
const DEFAULT_FEED_DIR: &str = "demo/feed";

/// 数据源类型，由文件名前缀决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedKind {
    Promotions,
    Carousel,
}

impl FeedKind {
    fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.starts_with("promotions") {
            Some(Self::Promotions)
        } else if name.starts_with("carousel") {
            Some(Self::Carousel)
        } else {
            None
        }
    }

    fn hint(self) -> MediaHint {
        match self {
            Self::Promotions => MediaHint::Ad,
            Self::Carousel => MediaHint::Product,
        }
    }
}

/// 检查结果
#[derive(Default)]
struct FeedCheckResult {
    files_checked: usize,
    items_checked: usize,
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// 用于检查的条目视图
struct ItemView<'a> {
    id: &'a ItemId,
    media_ref: Option<&'a MediaRef>,
    media_kind: MediaKind,
    cta_target: Option<&'a str>,
}

fn feed_check(path: Option<&Path>) -> anyhow::Result<()> {
    let root = path.unwrap_or_else(|| Path::new(DEFAULT_FEED_DIR));
    if !root.exists() {
        anyhow::bail!(
            "路径不存在: {}\n请在 workspace 根目录运行，或指定数据源路径",
            root.display()
        );
    }

    let files = collect_feed_files(root);
    if files.is_empty() {
        eprintln!("未找到数据源文件（promotions*.json / carousel*.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个数据源文件...\n", files.len());

    let resolver = MediaResolver::default();
    let mut result = FeedCheckResult::default();
    for (file, kind) in &files {
        check_feed_file(file, *kind, &resolver, &mut result);
    }

    print_check_result(&result);

    if !result.errors.is_empty() {
        anyhow::bail!("数据源检查发现错误");
    }
    Ok(())
}

/// 收集数据源文件，按路径排序
fn collect_feed_files(root: &Path) -> Vec<(PathBuf, FeedKind)> {
    let mut files: Vec<(PathBuf, FeedKind)> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| FeedKind::from_path(&path).map(|kind| (path, kind)))
        .collect();

    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}

fn check_feed_file(
    file: &Path,
    kind: FeedKind,
    resolver: &MediaResolver,
    result: &mut FeedCheckResult,
) {
    let name = file.display().to_string();
    result.files_checked += 1;

    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            result.errors.push(format!("{name}: 无法读取文件 - {e}"));
            return;
        }
    };

    match kind {
        FeedKind::Promotions => match parse_feed::<PromotionalItem>(&content) {
            Ok(items) => {
                for item in &items {
                    let seconds = item.display_duration_seconds;
                    if item.display_duration().as_secs_f64() != seconds {
                        result.warnings.push(format!(
                            "{name}: 条目 '{}' 展示时长 {seconds} 秒会被调整为 {:?}",
                            item.id,
                            item.display_duration()
                        ));
                    }
                }
                let views = items.iter().map(|item| ItemView {
                    id: &item.id,
                    media_ref: item.media_ref.as_ref(),
                    media_kind: item.media_kind,
                    cta_target: item.cta_target.as_deref(),
                });
                check_items(&name, kind, views, resolver, result);
            }
            Err(e) => result.errors.push(format!("{name}: {e}")),
        },
        FeedKind::Carousel => match parse_feed::<CarouselItem>(&content) {
            Ok(items) => {
                let views = items.iter().map(|item| ItemView {
                    id: &item.id,
                    media_ref: item.media_ref.as_ref(),
                    media_kind: item.media_kind,
                    cta_target: item.cta_target.as_deref(),
                });
                check_items(&name, kind, views, resolver, result);
            }
            Err(e) => result.errors.push(format!("{name}: {e}")),
        },
    }
}

fn check_items<'a>(
    name: &str,
    kind: FeedKind,
    items: impl Iterator<Item = ItemView<'a>>,
    resolver: &MediaResolver,
    result: &mut FeedCheckResult,
) {
    let mut seen = HashSet::new();
    let mut count = 0;

    for item in items {
        count += 1;

        if !seen.insert(item.id) {
            result
                .warnings
                .push(format!("{name}: 重复的条目 '{}'，只保留第一条", item.id));
        }

        let resolved = resolver.resolve(item.media_ref, Some(kind.hint()));
        if resolved.is_empty() {
            if item.media_kind == MediaKind::Video {
                result
                    .errors
                    .push(format!("{name}: 视频条目 '{}' 缺少媒体", item.id));
            } else {
                result
                    .warnings
                    .push(format!("{name}: 条目 '{}' 没有媒体，使用无图布局", item.id));
            }
        } else if !resolved.starts_with(resolver.api_prefix()) {
            result.warnings.push(format!(
                "{name}: 条目 '{}' 的媒体无法规范化: {resolved}",
                item.id
            ));
        }

        if kind == FeedKind::Promotions && item.cta_target.is_none() {
            result
                .warnings
                .push(format!("{name}: 条目 '{}' 没有行动按钮目标", item.id));
        }
    }

    if count == 0 {
        result
            .warnings
            .push(format!("{name}: 列表为空，页面将显示兜底内容"));
    }
    result.items_checked += count;
}

fn print_check_result(result: &FeedCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!(
        "检查完成: {} 个文件, {} 个条目",
        result.files_checked, result.items_checked
    );
    eprintln!();

    for error in &result.errors {
        eprintln!("[ERROR] {error}");
    }
    for warning in &result.warnings {
        eprintln!("[WARN] {warning}");
    }

    let error_count = result.errors.len();
    let warn_count = result.warnings.len();

    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {error_count} 个错误, {warn_count} 个警告");
    } else if warn_count > 0 {
        eprintln!("⚠️  0 个错误, {warn_count} 个警告");
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
