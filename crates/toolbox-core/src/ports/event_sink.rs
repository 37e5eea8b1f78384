//! EventSink port - 通知の送り先の抽象化
//!
//! Scheduler は状態を変えたロックの中で publish する。
//! そのため 1 タスクの通知は遷移順に届くが、実装側には制約がある:
//! - publish はブロックしないこと
//! - publish の中から Scheduler を呼び返さないこと（デッドロックする）

use crate::domain::TaskEvent;

/// EventSink は TaskEvent を presentation 層へ届ける
pub trait EventSink: Send + Sync {
    fn publish(&self, event: TaskEvent);
}
