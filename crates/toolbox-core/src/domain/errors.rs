//! Errors - エラー型
//!
//! - HandlerError: handler の実行エラー（Task の `error` に文字列として残る）
//! - TransitionError: 状態機械に存在しない遷移（バグ扱い）

use thiserror::Error;

use super::ids::TaskId;
use super::state::TaskStatus;

/// Error returned by a task handler.
///
/// Scheduler はこれを捕まえて `failed` に変換するだけで、上には伝播させない。
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode result: {0}")]
    Encode(String),

    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// An edge that the task state machine does not have.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal transition for {id}: {from} -> {to}")]
pub struct TransitionError {
    pub id: TaskId,
    pub from: TaskStatus,
    pub to: TaskStatus,
}
