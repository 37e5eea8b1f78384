//! Folder scanners - 投入前に presentation 層が使う同期 API
//!
//! 読めないエントリは黙ってスキップする（権限のないサブフォルダなど）。
//! 結果は深さ優先の走査順（同じフォルダ内はファイル名順）に並ぶ。

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::handlers::params::{FileInfo, FolderInfo, VideoFile};

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "ts"];

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn files_under(root: &Path) -> Result<impl Iterator<Item = DirEntry>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    Ok(WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file()))
}

fn size_of(entry: &DirEntry) -> u64 {
    entry.metadata().map(|m| m.len()).unwrap_or(0)
}

/// Every video below `root`, with the name of the folder it sits in.
pub fn scan_videos(root: impl AsRef<Path>) -> Result<Vec<VideoFile>, ScanError> {
    let root = root.as_ref();
    Ok(files_under(root)?
        .filter(|entry| has_extension(entry.path(), VIDEO_EXTENSIONS))
        .map(|entry| {
            let parent_folder = entry
                .path()
                .parent()
                .map(file_name)
                .unwrap_or_default();
            VideoFile {
                name: file_name(entry.path()),
                path: entry.path().to_path_buf(),
                size: size_of(&entry),
                parent_folder,
            }
        })
        .collect())
}

fn scan_by_extension(root: &Path, extension: &str) -> Result<Vec<FileInfo>, ScanError> {
    Ok(files_under(root)?
        .filter(|entry| has_extension(entry.path(), &[extension]))
        .map(|entry| FileInfo {
            name: file_name(entry.path()),
            path: entry.path().to_path_buf(),
            size: size_of(&entry),
        })
        .collect())
}

pub fn scan_7z_files(root: impl AsRef<Path>) -> Result<Vec<FileInfo>, ScanError> {
    scan_by_extension(root.as_ref(), "7z")
}

pub fn scan_txt_files(root: impl AsRef<Path>) -> Result<Vec<FileInfo>, ScanError> {
    scan_by_extension(root.as_ref(), "txt")
}

/// Sub-folders of `root` (not `root` itself) with images directly inside.
pub fn scan_image_folders(root: impl AsRef<Path>) -> Result<Vec<FolderInfo>, ScanError> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut folders = Vec::new();
    let dirs = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir());

    for dir in dirs {
        let images: Vec<DirEntry> = WalkDir::new(dir.path())
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), IMAGE_EXTENSIONS))
            .collect();
        if images.is_empty() {
            continue;
        }
        folders.push(FolderInfo {
            name: file_name(dir.path()),
            path: dir.path().to_path_buf(),
            image_count: images.len(),
            total_size: images.iter().map(size_of).sum(),
        });
    }
    Ok(folders)
}
