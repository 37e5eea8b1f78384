//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **NoopEventSink**: 通知を捨てる（CLI の quiet モード、テスト）
//! - **BroadcastEventSink**: 複数の購読者へ配る（GUI + ログなど）
//! - **ChannelEventSink**: 単一の購読者へ順序通りに届ける

pub mod event_sinks;

pub use self::event_sinks::{BroadcastEventSink, ChannelEventSink, NoopEventSink};
