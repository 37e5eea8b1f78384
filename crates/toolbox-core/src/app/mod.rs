//! App - アプリケーション層
//!
//! ports と typed registry を組み合わせてタスクキューを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: Scheduler の構築とワイヤリング
//! - **Scheduler**: 投入・admission・完了・キャンセル・一覧
//! - **SchedulerConfig**: 同時実行数などの設定
//! - **QueueCounts**: 状態ごとの件数

pub mod builder;
pub mod config;
pub mod scheduler;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{AppBuilder, BuildError};
pub use self::config::{ConfigError, SchedulerConfig};
pub use self::scheduler::Scheduler;
pub use self::status::QueueCounts;
