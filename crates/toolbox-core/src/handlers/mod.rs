//! Handlers - ツールボックスのタスク種別と handler 実装
//!
//! params はすべての種別の payload を定義する。
//! 実装済みの handler は shortcuts のみ（他の種別は presentation 層が登録する）。

pub mod params;
pub mod shortcuts;

pub use self::params::{
    ALL_TASK_TYPES, Convert7zParams, ConvertTxtParams, CreateShortcutsParams, EpubOptions,
    FileInfo, FolderInfo, Gallery, GalleryCrawlParams, NamingMode, PackImagesParams, VideoFile,
};
pub use self::shortcuts::{LINK_BATCH_SIZE, Linker, ShortcutHandler, SymlinkLinker};
