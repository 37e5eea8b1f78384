//! Domain identifiers.
//!
//! TaskId はキュー内で単調増加する整数 ID です。
//! - 採番は Scheduler のロック内で 1 回だけ行う
//! - 一度使った ID は clear_completed 後も再利用しない
//! - 生成順 = 作成順なので、`Ord` がそのまま FIFO の順序になる

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a Task (submit/status/cancel unit).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// IdSequence は TaskId の採番器
///
/// Scheduler の内部状態として保持され、ロックの外からは触れない。
#[derive(Debug)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next += 1;
        id
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
