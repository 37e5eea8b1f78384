//! Task record: the unit of trackable work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::TransitionError;
use super::ids::TaskId;
use super::state::TaskStatus;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(String);

impl TaskType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A task as tracked by the scheduler.
///
/// Design:
/// - This is the "single source of truth" for task state.
/// - All state transitions happen here, and each one checks the edge first.
/// - `result` and `error` are only ever set by the transition that owns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub name: String,
    pub data: serde_json::Value,
    pub status: TaskStatus,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        id: TaskId,
        task_type: TaskType,
        name: impl Into<String>,
        data: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_type,
            name: name.into(),
            data,
            status: TaskStatus::Pending,
            progress: 0,
            result: None,
            error: None,
            created_at,
            started_at: None,
            completed_at: None,
        }
    }

    fn transition(&mut self, to: TaskStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(to) {
            return Err(TransitionError {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// pending -> running
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(TaskStatus::Running)?;
        self.started_at = Some(now);
        Ok(())
    }

    /// running -> completed (progress is forced to 100).
    pub fn complete(
        &mut self,
        result: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.transition(TaskStatus::Completed)?;
        self.result = Some(result);
        self.progress = 100;
        self.completed_at = Some(now);
        Ok(())
    }

    /// running -> failed, or pending -> failed for a rejected submission.
    pub fn fail(&mut self, error: impl Into<String>, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(TaskStatus::Failed)?;
        self.error = Some(error.into());
        self.completed_at = Some(now);
        Ok(())
    }

    /// pending -> cancelled
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(TaskStatus::Cancelled)?;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Record progress while running.
    ///
    /// Values are clamped to 100 and never move backwards. Returns whether the
    /// stored value changed.
    pub fn set_progress(&mut self, percent: u8) -> bool {
        if self.status != TaskStatus::Running {
            return false;
        }
        let percent = percent.min(100);
        if percent <= self.progress {
            return false;
        }
        self.progress = percent;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn pending() -> Task {
        Task::new(
            TaskId::new(1),
            TaskType::new("pack-images"),
            "pack holiday photos",
            json!({ "folders": [] }),
            at(0),
        )
    }

    #[test]
    fn new_task_is_pending_without_timestamps() {
        let task = pending();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.progress, 0);
        assert!(task.started_at.is_none());
        assert!(task.completed_at.is_none());
        assert!(task.result.is_none() && task.error.is_none());
    }

    #[test]
    fn complete_sets_result_and_forces_progress() {
        let mut task = pending();
        task.start(at(1)).unwrap();
        task.set_progress(40);
        task.complete(json!({ "success": 3 }), at(2)).unwrap();

        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.progress, 100);
        assert_eq!(task.result, Some(json!({ "success": 3 })));
        assert!(task.error.is_none());
        assert_eq!(task.started_at, Some(at(1)));
        assert_eq!(task.completed_at, Some(at(2)));
    }

    #[test]
    fn fail_sets_error_only() {
        let mut task = pending();
        task.start(at(1)).unwrap();
        task.fail("disk full", at(2)).unwrap();

        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.error.as_deref(), Some("disk full"));
        assert!(task.result.is_none());
    }

    #[test]
    fn cannot_complete_a_pending_task() {
        let mut task = pending();
        let err = task.complete(json!(null), at(1)).unwrap_err();
        assert_eq!(err.from, TaskStatus::Pending);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.result.is_none());
    }

    #[test]
    fn cannot_cancel_a_running_task() {
        let mut task = pending();
        task.start(at(1)).unwrap();
        assert!(task.cancel(at(2)).is_err());
        assert_eq!(task.status, TaskStatus::Running);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn progress_is_clamped_and_monotonic() {
        let mut task = pending();
        assert!(!task.set_progress(10), "ignored while pending");

        task.start(at(1)).unwrap();
        assert!(task.set_progress(30));
        assert!(!task.set_progress(20));
        assert_eq!(task.progress, 30);
        assert!(task.set_progress(250));
        assert_eq!(task.progress, 100);
    }

    #[test]
    fn serializes_in_camel_case() {
        let task = pending();
        let v = serde_json::to_value(&task).unwrap();
        assert_eq!(v["type"], "pack-images");
        assert_eq!(v["status"], "pending");
        assert!(v.get("createdAt").is_some());
        assert!(v.get("startedAt").is_some());
        assert!(v.get("result").is_none());
    }
}
