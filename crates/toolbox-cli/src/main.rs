//! `toolbox` - コマンドラインからタスクキューを動かすフロントエンド
//!
//! Usage:
//!   toolbox scan-videos <dir>
//!   toolbox shortcuts <source> <target> [--naming folder-only]
//!   toolbox --config toolbox.json --max-concurrent 4 shortcuts ...
//!
//! 結果の JSON は stdout、ログと進捗は stderr に出る。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use toolbox_core::handlers::{CreateShortcutsParams, NamingMode, ShortcutHandler};
use toolbox_core::impls::BroadcastEventSink;
use toolbox_core::scan;
use toolbox_core::typed::TaskParams;
use toolbox_core::{AppBuilder, Scheduler, SchedulerConfig, TaskEvent, TaskStatus};

#[derive(Parser, Debug)]
#[command(name = "toolbox", about = "File toolbox backed by a background task queue")]
struct Cli {
    /// JSON scheduler config (`{ "maxConcurrent": 2 }`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `maxConcurrent` from the config file.
    #[arg(long, global = true)]
    max_concurrent: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List videos below a folder.
    ScanVideos { dir: PathBuf },
    /// List 7z archives below a folder.
    #[command(name = "scan-7z")]
    Scan7z { dir: PathBuf },
    /// List folders that directly contain images.
    ScanImages { dir: PathBuf },
    /// List text files below a folder.
    ScanTxt { dir: PathBuf },
    /// Link every video below `source` into `target`.
    Shortcuts {
        source: PathBuf,
        target: PathBuf,
        #[arg(long, value_enum, default_value_t = Naming::Original)]
        naming: Naming,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Naming {
    Original,
    Folder,
    FolderOnly,
}

impl From<Naming> for NamingMode {
    fn from(naming: Naming) -> Self {
        match naming {
            Naming::Original => NamingMode::Original,
            Naming::Folder => NamingMode::Folder,
            Naming::FolderOnly => NamingMode::FolderOnly,
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<SchedulerConfig> {
    let mut config = match &cli.config {
        Some(path) => SchedulerConfig::from_path(path)?,
        None => SchedulerConfig::default(),
    };
    if let Some(max) = cli.max_concurrent {
        config = config.with_max_concurrent(max);
    }
    config.validate()?;
    Ok(config)
}

/// Logs every notification until the sink is gone.
async fn watch_events(mut rx: tokio::sync::broadcast::Receiver<TaskEvent>) {
    loop {
        match rx.recv().await {
            Ok(TaskEvent::TaskChanged(task)) => info!(
                task_id = %task.id,
                status = %task.status,
                progress = task.progress,
                "{}",
                task.name
            ),
            Ok(TaskEvent::TaskListChanged(tasks)) => info!(remaining = tasks.len(), "task list changed"),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "event watcher fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}

async fn run_shortcuts(
    config: SchedulerConfig,
    source: PathBuf,
    target: PathBuf,
    naming: NamingMode,
) -> anyhow::Result<()> {
    let videos = scan::scan_videos(&source)?;
    info!(count = videos.len(), source = %source.display(), "videos found");

    let sink = Arc::new(BroadcastEventSink::new(config.event_capacity));
    let watcher = tokio::spawn(watch_events(sink.subscribe()));

    let scheduler: Scheduler = AppBuilder::new()
        .register::<CreateShortcutsParams, _>(ShortcutHandler::default())?
        .expect_tasks(&[CreateShortcutsParams::TYPE])
        .config(config)
        .shared_event_sink(sink.clone())
        .build()?;

    let params = CreateShortcutsParams {
        videos,
        target_path: target,
        naming_mode: naming,
    };
    let id = scheduler.submit_params(&params, format!("shortcuts from {}", source.display()))?;
    scheduler.wait_idle().await;

    let counts = scheduler.counts();
    info!(
        total = counts.total(),
        completed = counts.completed,
        failed = counts.failed,
        "queue idle"
    );

    let task = scheduler
        .get(id)
        .with_context(|| format!("{id} disappeared from the queue"))?;

    // let the watcher drain what is left, then stop
    drop(scheduler);
    drop(sink);
    let _ = tokio::time::timeout(Duration::from_millis(500), watcher).await;

    print_json(&task)?;
    if task.status == TaskStatus::Failed {
        anyhow::bail!("{id} failed: {}", task.error.unwrap_or_default());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::ScanVideos { dir } => print_json(&scan::scan_videos(dir)?),
        Command::Scan7z { dir } => print_json(&scan::scan_7z_files(dir)?),
        Command::ScanImages { dir } => print_json(&scan::scan_image_folders(dir)?),
        Command::ScanTxt { dir } => print_json(&scan::scan_txt_files(dir)?),
        Command::Shortcuts {
            source,
            target,
            naming,
        } => run_shortcuts(config, source, target, naming.into()).await,
    }
}
