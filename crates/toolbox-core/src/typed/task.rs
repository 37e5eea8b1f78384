//! TaskParams trait - 型付き payload の定義
//!
//! # 学習ポイント
//! - Associated Constants (`const TYPE`)
//! - Associated Types (`type Output`)
//! - Trait bounds の組み合わせ (Serialize + DeserializeOwned + Send + Sync + 'static)

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// TaskParams は task_type と payload の型を対応付ける
///
/// # 使用例
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct PackImagesParams {
///     folders: Vec<FolderInfo>,
///     target_path: PathBuf,
/// }
///
/// impl TaskParams for PackImagesParams {
///     const TYPE: &'static str = "pack-images";
///     type Output = TaskReport;
/// }
/// ```
///
/// # Trait Bounds
/// - `Serialize`: presentation 層から送る payload を組み立てるため
/// - `DeserializeOwned`: Task の `data`（JSON）から復元するため
/// - `Send + Sync + 'static`: handler の実行は別タスクで行われるため
pub trait TaskParams: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// task_type の定義（例: `create-shortcuts`）
    const TYPE: &'static str;

    /// handler が返す結果。Task の `result` に JSON として格納される。
    type Output: Serialize + Send + 'static;
}

// テスト用の payload 型
#[cfg(test)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestTask {
    pub value: i32,
}

#[cfg(test)]
impl TaskParams for TestTask {
    const TYPE: &'static str = "test.task";
    type Output = i32;
}

#[cfg(test)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnotherTestTask {
    pub name: String,
}

#[cfg(test)]
impl TaskParams for AnotherTestTask {
    const TYPE: &'static str = "test.another";
    type Output = String;
}
