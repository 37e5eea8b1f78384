//! Payload types for the toolbox task types.
//!
//! Field names follow the presentation layer (camelCase JSON).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::TaskReport;
use crate::typed::TaskParams;

/// A video found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    /// Name of the directory the video sits in.
    pub parent_folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// A folder with at least one image directly inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderInfo {
    pub name: String,
    pub path: PathBuf,
    pub image_count: usize,
    pub total_size: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NamingMode {
    /// `clip.mp4`
    #[default]
    Original,
    /// `{parentFolder}_clip.mp4`
    Folder,
    /// `{parentFolder}.mp4`, numbered on collision
    FolderOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShortcutsParams {
    pub videos: Vec<VideoFile>,
    pub target_path: PathBuf,
    #[serde(default)]
    pub naming_mode: NamingMode,
}

impl TaskParams for CreateShortcutsParams {
    const TYPE: &'static str = "create-shortcuts";
    type Output = TaskReport;
}

fn default_compression_level() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Convert7zParams {
    pub files: Vec<FileInfo>,
    /// Videos found inside an archive are moved here instead of being zipped.
    pub video_output_path: PathBuf,
    #[serde(default)]
    pub keep_original: bool,
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

impl TaskParams for Convert7zParams {
    const TYPE: &'static str = "convert-7z-to-zip";
    type Output = TaskReport;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackImagesParams {
    pub folders: Vec<FolderInfo>,
    pub target_path: PathBuf,
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

impl TaskParams for PackImagesParams {
    const TYPE: &'static str = "pack-images";
    type Output = TaskReport;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpubOptions {
    #[serde(default)]
    pub author: Option<String>,
    /// Chapter heading regex overriding the built-in patterns.
    #[serde(default)]
    pub custom_pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertTxtParams {
    pub files: Vec<FileInfo>,
    pub output_path: PathBuf,
    #[serde(default)]
    pub options: EpubOptions,
}

impl TaskParams for ConvertTxtParams {
    const TYPE: &'static str = "convert-txt-to-epub";
    type Output = TaskReport;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub image_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryCrawlParams {
    pub galleries: Vec<Gallery>,
    pub output_path: PathBuf,
}

impl TaskParams for GalleryCrawlParams {
    const TYPE: &'static str = "gallery-crawl";
    type Output = TaskReport;
}

/// Every task type the toolbox front end knows how to submit.
pub const ALL_TASK_TYPES: [&str; 5] = [
    CreateShortcutsParams::TYPE,
    Convert7zParams::TYPE,
    PackImagesParams::TYPE,
    ConvertTxtParams::TYPE,
    GalleryCrawlParams::TYPE,
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shortcut_params_accept_front_end_json() {
        let params: CreateShortcutsParams = serde_json::from_value(json!({
            "videos": [
                { "name": "a.mp4", "path": "/in/show/a.mp4", "size": 10, "parentFolder": "show" }
            ],
            "targetPath": "/out",
            "namingMode": "folderOnly"
        }))
        .unwrap();

        assert_eq!(params.naming_mode, NamingMode::FolderOnly);
        assert_eq!(params.videos[0].parent_folder, "show");
    }

    #[test]
    fn naming_mode_defaults_to_original() {
        let params: CreateShortcutsParams =
            serde_json::from_value(json!({ "videos": [], "targetPath": "/out" })).unwrap();
        assert_eq!(params.naming_mode, NamingMode::Original);
    }

    #[test]
    fn compression_level_defaults_to_fast() {
        let params: PackImagesParams =
            serde_json::from_value(json!({ "folders": [], "targetPath": "/out" })).unwrap();
        assert_eq!(params.compression_level, 1);

        let params: Convert7zParams =
            serde_json::from_value(json!({ "files": [], "videoOutputPath": "/v" })).unwrap();
        assert!(!params.keep_original);
    }

    #[test]
    fn task_types_are_unique() {
        let mut types = ALL_TASK_TYPES.to_vec();
        types.sort();
        types.dedup();
        assert_eq!(types.len(), ALL_TASK_TYPES.len());
    }
}
