//! Handler trait - TaskParams を実行する Handler の定義
//!
//! # 学習ポイント
//! - ジェネリック trait (Handler<P>)
//! - Object-safe trait (DynHandler)
//! - Type erasure パターン (TypedHandler<P, H> → DynHandler)

use super::progress::ProgressReporter;
use super::task::TaskParams;
use crate::domain::HandlerError;
use async_trait::async_trait;
use std::marker::PhantomData;

/// Handler は payload を受け取って処理し、結果を返す
///
/// # 使用例
/// ```ignore
/// struct PackImagesHandler;
///
/// #[async_trait]
/// impl Handler<PackImagesParams> for PackImagesHandler {
///     async fn handle(
///         &self,
///         params: PackImagesParams,
///         progress: ProgressReporter,
///     ) -> Result<TaskReport, HandlerError> {
///         // ...
///         progress.report_fraction(done, total);
///         Ok(report)
///     }
/// }
/// ```
///
/// # ジェネリクスによる型安全性
/// - `Handler<PackImagesParams>` は `PackImagesParams` しか受け取れない
/// - payload のデコードは TypedHandler が一箇所で行う
#[async_trait]
pub trait Handler<P: TaskParams>: Send + Sync {
    async fn handle(
        &self,
        params: P,
        progress: ProgressReporter,
    ) -> Result<P::Output, HandlerError>;
}

/// DynHandler は object-safe な Handler の抽象化
///
/// TypedHandler<P, H> を DynHandler に変換することで、
/// HashMap<String, Arc<dyn DynHandler>> に格納可能にします。
#[async_trait]
pub trait DynHandler: Send + Sync {
    async fn handle_dyn(
        &self,
        data: serde_json::Value,
        progress: ProgressReporter,
    ) -> Result<serde_json::Value, HandlerError>;

    fn task_type(&self) -> &str;
}

pub struct TypedHandler<P: TaskParams, H: Handler<P>> {
    handler: H,
    _marker: PhantomData<fn() -> P>,
}

impl<P: TaskParams, H: Handler<P>> TypedHandler<P, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<P: TaskParams, H: Handler<P>> DynHandler for TypedHandler<P, H> {
    async fn handle_dyn(
        &self,
        data: serde_json::Value,
        progress: ProgressReporter,
    ) -> Result<serde_json::Value, HandlerError> {
        let params: P = serde_json::from_value(data)
            .map_err(|e| HandlerError::InvalidPayload(format!("{}: {e}", P::TYPE)))?;
        let output = self.handler.handle(params, progress).await?;
        serde_json::to_value(output).map_err(|e| HandlerError::Encode(e.to_string()))
    }

    fn task_type(&self) -> &str {
        P::TYPE
    }
}

#[cfg(test)]
pub(crate) use self::test_handlers::{AnotherTestTaskHandler, TestTaskHandler};

#[cfg(test)]
mod test_handlers {
    use super::*;
    use crate::typed::task::{AnotherTestTask, TestTask};

    /// Doubles the value.
    pub struct TestTaskHandler;

    #[async_trait]
    impl Handler<TestTask> for TestTaskHandler {
        async fn handle(&self, task: TestTask, progress: ProgressReporter) -> Result<i32, HandlerError> {
            progress.report(50);
            Ok(task.value * 2)
        }
    }

    pub struct AnotherTestTaskHandler;

    #[async_trait]
    impl Handler<AnotherTestTask> for AnotherTestTaskHandler {
        async fn handle(
            &self,
            task: AnotherTestTask,
            _progress: ProgressReporter,
        ) -> Result<String, HandlerError> {
            Ok(format!("hello, {}", task.name))
        }
    }
}
