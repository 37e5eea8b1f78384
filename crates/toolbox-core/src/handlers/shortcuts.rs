//! Shortcut handler - 動画へのリンクを 1 つのフォルダにまとめる
//!
//! # フロー
//! 1. target_path を作成（失敗したらタスク自体を failed にする）
//! 2. 動画を batch_size 件ずつ並行にリンク
//! 3. batch ごとに進捗を通知
//! 4. 個々のリンク失敗は TaskReport に記録するだけ（タスクは completed）
//!
//! リンク名は batch を spawn する前に逐次決めるので、
//! 同じ batch 内で名前が衝突することはない。

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::debug;

use super::params::{CreateShortcutsParams, NamingMode, VideoFile};
use crate::domain::{HandlerError, TaskReport};
use crate::typed::{Handler, ProgressReporter};

/// Number of links created concurrently.
pub const LINK_BATCH_SIZE: usize = 10;

/// Creates one link on disk.
#[async_trait]
pub trait Linker: Send + Sync {
    async fn link(&self, target: &Path, link: &Path) -> std::io::Result<()>;
}

/// Plain symbolic links.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymlinkLinker;

#[async_trait]
impl Linker for SymlinkLinker {
    #[cfg(unix)]
    async fn link(&self, target: &Path, link: &Path) -> std::io::Result<()> {
        tokio::fs::symlink(target, link).await
    }

    #[cfg(not(unix))]
    async fn link(&self, _target: &Path, _link: &Path) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "symbolic links are only supported on unix",
        ))
    }
}

pub struct ShortcutHandler {
    linker: Arc<dyn Linker>,
    batch_size: usize,
}

impl ShortcutHandler {
    pub fn new(linker: impl Linker + 'static) -> Self {
        Self {
            linker: Arc::new(linker),
            batch_size: LINK_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

impl Default for ShortcutHandler {
    fn default() -> Self {
        Self::new(SymlinkLinker)
    }
}

#[async_trait]
impl Handler<CreateShortcutsParams> for ShortcutHandler {
    async fn handle(
        &self,
        params: CreateShortcutsParams,
        progress: ProgressReporter,
    ) -> Result<TaskReport, HandlerError> {
        tokio::fs::create_dir_all(&params.target_path).await?;

        let total = params.videos.len();
        let mut report = TaskReport::new();
        let mut reserved = HashSet::new();
        let mut done = 0;

        for batch in params.videos.chunks(self.batch_size) {
            let mut jobs = JoinSet::new();
            for video in batch {
                let name =
                    reserve_link_name(video, params.naming_mode, &params.target_path, &mut reserved)
                        .await;
                let link = params.target_path.join(name);
                let target = video.path.clone();
                let item = video.name.clone();
                let linker = Arc::clone(&self.linker);
                jobs.spawn(async move {
                    let result = linker.link(&target, &link).await;
                    (item, result)
                });
            }

            while let Some(joined) = jobs.join_next().await {
                match joined {
                    Ok((_, Ok(()))) => report.record_success(),
                    Ok((item, Err(e))) => report.record_failure(item, e.to_string()),
                    Err(e) => report.record_failure("<link job>", e.to_string()),
                }
            }

            done += batch.len();
            progress.report_fraction(done, total);
        }

        debug!(
            task_id = %progress.task_id(),
            total = report.total(),
            failed = report.failed,
            "shortcuts created"
        );
        Ok(report)
    }
}

/// Link name before collision handling.
pub fn base_link_name(video: &VideoFile, mode: NamingMode) -> String {
    match mode {
        NamingMode::Original => video.name.clone(),
        NamingMode::Folder => format!("{}_{}", video.parent_folder, video.name),
        NamingMode::FolderOnly => format!("{}{}", video.parent_folder, extension_of(&video.name)),
    }
}

/// `.mp4` for `clip.mp4`, empty when there is no extension.
fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

async fn exists(path: PathBuf) -> bool {
    // symlink_metadata: dangling links count as taken
    tokio::fs::symlink_metadata(path).await.is_ok()
}

/// Pick the final name and remember it for the rest of the task.
///
/// Only `FolderOnly` renames on collision (`show.mp4`, `show_1.mp4`, ...);
/// the other modes keep their name and let the link fail.
async fn reserve_link_name(
    video: &VideoFile,
    mode: NamingMode,
    target_dir: &Path,
    reserved: &mut HashSet<String>,
) -> String {
    let mut name = base_link_name(video, mode);
    if mode == NamingMode::FolderOnly {
        let ext = extension_of(&video.name);
        let mut counter = 1;
        while reserved.contains(&name) || exists(target_dir.join(&name)).await {
            name = format!("{}_{}{}", video.parent_folder, counter, ext);
            counter += 1;
        }
    }
    reserved.insert(name.clone());
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use parking_lot::Mutex;
    use rstest::rstest;

    fn video(name: &str, parent: &str) -> VideoFile {
        VideoFile {
            name: name.to_string(),
            path: PathBuf::from(format!("/library/{parent}/{name}")),
            size: 1,
            parent_folder: parent.to_string(),
        }
    }

    /// Records link names instead of touching the disk.
    #[derive(Clone, Default)]
    struct RecordingLinker {
        links: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Linker for RecordingLinker {
        async fn link(&self, _target: &Path, link: &Path) -> std::io::Result<()> {
            let name = link.file_name().unwrap().to_string_lossy().into_owned();
            if name.contains("broken") {
                return Err(std::io::Error::other("target vanished"));
            }
            self.links.lock().push(name);
            Ok(())
        }
    }

    #[rstest]
    #[case::original(NamingMode::Original, "ep01.mkv")]
    #[case::folder(NamingMode::Folder, "Show_ep01.mkv")]
    #[case::folder_only(NamingMode::FolderOnly, "Show.mkv")]
    fn naming_modes(#[case] mode: NamingMode, #[case] expected: &str) {
        assert_eq!(base_link_name(&video("ep01.mkv", "Show"), mode), expected);
    }

    #[test]
    fn folder_only_without_extension() {
        assert_eq!(base_link_name(&video("README", "Show"), NamingMode::FolderOnly), "Show");
    }

    #[tokio::test]
    async fn folder_only_numbers_collisions_within_a_task() {
        let dir = tempfile::tempdir().unwrap();
        let linker = RecordingLinker::default();
        let handler = ShortcutHandler::new(linker.clone()).with_batch_size(2);

        let params = CreateShortcutsParams {
            videos: vec![
                video("a.mp4", "Show"),
                video("b.mp4", "Show"),
                video("c.mp4", "Show"),
                video("d.mp4", "Other"),
            ],
            target_path: dir.path().to_path_buf(),
            naming_mode: NamingMode::FolderOnly,
        };

        let report = handler
            .handle(params, ProgressReporter::noop(TaskId::new(1)))
            .await
            .unwrap();
        assert_eq!(report.success, 4);

        let mut links = linker.links.lock().clone();
        links.sort();
        assert_eq!(links, vec!["Other.mp4", "Show.mp4", "Show_1.mp4", "Show_2.mp4"]);
    }

    #[tokio::test]
    async fn folder_only_skips_names_already_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Show.mp4"), b"").unwrap();
        let linker = RecordingLinker::default();

        let params = CreateShortcutsParams {
            videos: vec![video("a.mp4", "Show")],
            target_path: dir.path().to_path_buf(),
            naming_mode: NamingMode::FolderOnly,
        };
        ShortcutHandler::new(linker.clone())
            .handle(params, ProgressReporter::noop(TaskId::new(1)))
            .await
            .unwrap();

        assert_eq!(*linker.links.lock(), vec!["Show_1.mp4".to_string()]);
    }

    #[tokio::test]
    async fn item_failures_are_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let params = CreateShortcutsParams {
            videos: vec![video("ok.mp4", "A"), video("broken.mp4", "B")],
            target_path: dir.path().to_path_buf(),
            naming_mode: NamingMode::Original,
        };

        let report = ShortcutHandler::new(RecordingLinker::default())
            .handle(params, ProgressReporter::noop(TaskId::new(1)))
            .await
            .unwrap();

        assert_eq!(report.success, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors[0].file.as_deref(), Some("broken.mp4"));
        assert!(report.errors[0].gallery.is_none());
        assert!(report.errors[0].error.contains("target vanished"));
    }

    #[tokio::test]
    async fn progress_is_reported_per_batch() {
        let dir = tempfile::tempdir().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = ProgressReporter::new(TaskId::new(3), move |_, p| sink.lock().push(p));

        let params = CreateShortcutsParams {
            videos: (0..5).map(|i| video(&format!("{i}.mp4"), "S")).collect(),
            target_path: dir.path().to_path_buf(),
            naming_mode: NamingMode::Original,
        };
        ShortcutHandler::new(RecordingLinker::default())
            .with_batch_size(2)
            .handle(params, progress)
            .await
            .unwrap();

        assert_eq!(*seen.lock(), vec![40, 80, 100]);
    }

    #[tokio::test]
    async fn unusable_target_fails_the_task() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let params = CreateShortcutsParams {
            videos: vec![video("a.mp4", "A")],
            target_path: file.join("nested"),
            naming_mode: NamingMode::Original,
        };
        let err = ShortcutHandler::default()
            .handle(params, ProgressReporter::noop(TaskId::new(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Io(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_point_at_the_video() {
        let library = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let source = library.path().join("ep01.mkv");
        std::fs::write(&source, b"frames").unwrap();

        let params = CreateShortcutsParams {
            videos: vec![VideoFile {
                name: "ep01.mkv".into(),
                path: source.clone(),
                size: 6,
                parent_folder: "Show".into(),
            }],
            target_path: out.path().to_path_buf(),
            naming_mode: NamingMode::Folder,
        };
        let report = ShortcutHandler::default()
            .handle(params, ProgressReporter::noop(TaskId::new(1)))
            .await
            .unwrap();

        assert_eq!(report.success, 1);
        let link = out.path().join("Show_ep01.mkv");
        assert_eq!(std::fs::read_link(&link).unwrap(), source);
        assert_eq!(std::fs::read(&link).unwrap(), b"frames");
    }
}
