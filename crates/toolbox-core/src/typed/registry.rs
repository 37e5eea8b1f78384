//! TypedRegistry - Handler の登録と管理
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - Generic methods での登録と型安全性
//! - Arc による共有所有権
//!
//! 起動時に組み立て（mutable）、実行時は読み取りのみ（immutable）。
//! Scheduler はロックを取らずに参照できる。

use crate::typed::handler::TypedHandler;

use super::handler::{DynHandler, Handler};
use super::task::TaskParams;
use std::collections::HashMap;
use std::sync::Arc;

/// TypedRegistry は型付き Handler を登録・管理
///
/// # 使用例
/// ```ignore
/// let mut registry = TypedRegistry::new();
/// registry.register::<CreateShortcutsParams, _>(ShortcutHandler::default())?;
///
/// let handler = registry.get("create-shortcuts");
/// ```
#[derive(Default)]
pub struct TypedRegistry {
    handlers: HashMap<String, Arc<dyn DynHandler>>,
}

/// RegistryError は TypedRegistry の操作エラー
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Handler for task type '{0}' is already registered")]
    AlreadyRegistered(String),
}

impl TypedRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<P: TaskParams, H: Handler<P> + 'static>(
        &mut self,
        handler: H,
    ) -> Result<(), RegistryError> {
        self.register_dyn(Arc::new(TypedHandler::new(handler)))
    }

    /// Register an already type-erased handler under its own task type.
    pub fn register_dyn(&mut self, handler: Arc<dyn DynHandler>) -> Result<(), RegistryError> {
        let task_type = handler.task_type().to_string();
        if self.handlers.contains_key(&task_type) {
            return Err(RegistryError::AlreadyRegistered(task_type));
        }
        self.handlers.insert(task_type, handler);
        Ok(())
    }

    pub fn get(&self, task_type: &str) -> Option<Arc<dyn DynHandler>> {
        self.handlers.get(task_type).cloned()
    }

    pub fn contains(&self, task_type: &str) -> bool {
        self.handlers.contains_key(task_type)
    }

    /// Registered task types, sorted.
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::handler::{AnotherTestTaskHandler, TestTaskHandler};
    use crate::typed::task::{AnotherTestTask, TestTask};

    #[test]
    fn test_register_and_get() {
        let mut registry = TypedRegistry::new();
        registry.register::<TestTask, _>(TestTaskHandler).unwrap();

        let retrieved = registry.get(TestTask::TYPE);
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().task_type(), TestTask::TYPE);
        assert!(registry.contains(TestTask::TYPE));
    }

    #[test]
    fn test_double_registration() {
        let mut registry = TypedRegistry::new();
        registry.register::<TestTask, _>(TestTaskHandler).unwrap();
        let result = registry.register::<TestTask, _>(TestTaskHandler);
        assert!(matches!(result, Err(RegistryError::AlreadyRegistered(t)) if t == TestTask::TYPE));
    }

    #[test]
    fn test_registered_types_are_sorted() {
        let mut registry = TypedRegistry::new();
        registry.register::<TestTask, _>(TestTaskHandler).unwrap();
        registry
            .register::<AnotherTestTask, _>(AnotherTestTaskHandler)
            .unwrap();

        assert_eq!(
            registry.registered_types(),
            vec![AnotherTestTask::TYPE.to_string(), TestTask::TYPE.to_string()]
        );
    }

    #[test]
    fn test_unknown_type() {
        let registry = TypedRegistry::new();
        assert!(registry.get("convert-txt-to-epub").is_none());
        assert!(!registry.contains("convert-txt-to-epub"));
    }
}
