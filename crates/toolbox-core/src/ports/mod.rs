//! Ports - 抽象化レイヤー
//!
//! Scheduler が外部に依存する箇所（時刻、通知の送り先）を trait として切り出す。
//! 実装は `impls` に置く。

pub mod clock;
pub mod event_sink;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::EventSink;
