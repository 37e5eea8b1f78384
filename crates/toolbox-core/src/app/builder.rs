//! AppBuilder - Scheduler の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 開発体験の改善（明確なエラーメッセージ）

use std::sync::Arc;

use tokio::runtime::Handle;

use super::config::{ConfigError, SchedulerConfig};
use super::scheduler::Scheduler;
use crate::impls::NoopEventSink;
use crate::ports::{Clock, EventSink, SystemClock};
use crate::typed::{Handler, RegistryError, TaskParams, TypedRegistry};

/// AppBuilder は Scheduler を構築
///
/// # 使用例
/// ```ignore
/// let scheduler = AppBuilder::new()
///     .register::<CreateShortcutsParams, _>(ShortcutHandler::default())?
///     .expect_tasks(&[CreateShortcutsParams::TYPE])
///     .max_concurrent(2)
///     .event_sink(sink)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_tasks() で期待される task_type を登録
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
/// - 設定値（max_concurrent など）もここで検証する
pub struct AppBuilder {
    registry: TypedRegistry,
    expected_tasks: Option<Vec<String>>,
    config: SchedulerConfig,
    sink: Option<Arc<dyn EventSink>>,
    clock: Option<Arc<dyn Clock>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing task types: {0:?}. These tasks were expected but not registered.")]
    MissingTaskTypes(Vec<String>),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Scheduler must be built inside a tokio runtime")]
    NoRuntime,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            registry: TypedRegistry::new(),
            expected_tasks: None,
            config: SchedulerConfig::default(),
            sink: None,
            clock: None,
        }
    }

    /// Handler を登録
    pub fn register<P: TaskParams, H: Handler<P> + 'static>(
        mut self,
        handler: H,
    ) -> Result<Self, RegistryError> {
        self.registry.register::<P, H>(handler)?;
        Ok(self)
    }

    /// 期待される task_type のリストを設定
    pub fn expect_tasks(mut self, task_types: &[&str]) -> Self {
        self.expected_tasks = Some(task_types.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.config.max_concurrent = max_concurrent;
        self
    }

    pub fn event_sink(self, sink: impl EventSink + 'static) -> Self {
        self.shared_event_sink(Arc::new(sink))
    }

    /// Use a sink that the caller keeps a handle to (e.g. to subscribe later).
    pub fn shared_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// AppBuilder を検証して Scheduler を生成
    ///
    /// # 検証
    /// - expect_tasks() の task_type が全て登録されているか
    /// - 設定値が妥当か
    /// - tokio runtime の中で呼ばれているか（handler の spawn 先になる）
    pub fn build(self) -> Result<Scheduler, BuildError> {
        if let Some(expected_tasks) = &self.expected_tasks {
            let missing_tasks: Vec<String> = expected_tasks
                .iter()
                .filter(|t| !self.registry.contains(t))
                .cloned()
                .collect();
            if !missing_tasks.is_empty() {
                return Err(BuildError::MissingTaskTypes(missing_tasks));
            }
        }
        self.config.validate()?;
        let runtime = Handle::try_current().map_err(|_| BuildError::NoRuntime)?;

        Ok(Scheduler::new(
            self.registry,
            self.sink.unwrap_or_else(|| Arc::new(NoopEventSink)),
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            runtime,
            self.config.max_concurrent,
        ))
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
