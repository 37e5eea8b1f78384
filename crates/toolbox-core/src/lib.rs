//! toolbox-core
//!
//! Background task queue for the desktop toolbox.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, state, events, outcome, errors）
//! - **ports**: 抽象化レイヤー（Clock, EventSink）
//! - **impls**: ports の実装（Noop / Broadcast / Channel の EventSink）
//! - **typed**: 型付き Task API（TaskParams, Handler, TypedRegistry, ProgressReporter）
//! - **app**: Scheduler 本体（builder, config, scheduler, status）
//! - **handlers**: ツールボックスのタスク種別と shortcut handler
//! - **scan**: 投入前にフォルダを走査する同期 API

pub mod app;
pub mod domain;
pub mod handlers;
pub mod impls;
pub mod ports;
pub mod scan;
pub mod typed;

pub use self::app::{AppBuilder, BuildError, QueueCounts, Scheduler, SchedulerConfig};
pub use self::domain::{Task, TaskEvent, TaskId, TaskReport, TaskStatus, TaskType};
