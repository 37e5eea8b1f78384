//! Events - presentation 層へ push する通知

use serde::{Deserialize, Serialize};

use super::task::Task;

/// TaskEvent は Scheduler が EventSink に publish する通知
///
/// - TaskChanged: 1 タスクの遷移・進捗更新ごと
/// - TaskListChanged: clear_completed などの一括操作の後
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum TaskEvent {
    TaskChanged(Task),
    TaskListChanged(Vec<Task>),
}

impl TaskEvent {
    /// The task carried by a `TaskChanged` event.
    pub fn task(&self) -> Option<&Task> {
        match self {
            TaskEvent::TaskChanged(task) => Some(task),
            TaskEvent::TaskListChanged(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskId, TaskType};
    use chrono::Utc;

    #[test]
    fn event_names_match_presentation_channels() {
        let task = Task::new(
            TaskId::new(1),
            TaskType::new("create-shortcuts"),
            "links",
            serde_json::json!({}),
            Utc::now(),
        );

        let v = serde_json::to_value(TaskEvent::TaskChanged(task)).unwrap();
        assert_eq!(v["event"], "task-changed");
        assert_eq!(v["payload"]["id"], 1);

        let v = serde_json::to_value(TaskEvent::TaskListChanged(vec![])).unwrap();
        assert_eq!(v["event"], "task-list-changed");
    }
}
