//! ProgressReporter - handler から Scheduler への進捗通知
//!
//! handler は Task レコードに直接触れない。
//! 呼び出し時に渡される ProgressReporter だけが、自分のタスクの progress を更新できる。

use std::fmt;
use std::sync::Arc;

use crate::domain::TaskId;

type ReportFn = dyn Fn(TaskId, u8) + Send + Sync;

/// Progress callback scoped to one task invocation.
///
/// Cheap to clone, so a handler can hand copies to its own sub-workers.
#[derive(Clone)]
pub struct ProgressReporter {
    task_id: TaskId,
    report: Arc<ReportFn>,
}

impl ProgressReporter {
    pub fn new(task_id: TaskId, report: impl Fn(TaskId, u8) + Send + Sync + 'static) -> Self {
        Self {
            task_id,
            report: Arc::new(report),
        }
    }

    /// A reporter that discards every report.
    pub fn noop(task_id: TaskId) -> Self {
        Self::new(task_id, |_, _| {})
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Report a percentage. Values above 100 are clamped by the scheduler.
    pub fn report(&self, percent: u8) {
        (self.report)(self.task_id, percent);
    }

    /// Report `current` of `total` items done, rounded to the nearest percent.
    pub fn report_fraction(&self, current: usize, total: usize) {
        self.report(percent_of(current, total));
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("task_id", &self.task_id)
            .finish_non_exhaustive()
    }
}

pub(crate) fn percent_of(current: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let current = current.min(total);
    ((current as f64 / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 3, 33)]
    #[case(2, 3, 67)]
    #[case(10, 10, 100)]
    #[case(12, 10, 100)]
    #[case(0, 0, 100)]
    fn fraction_rounds(#[case] current: usize, #[case] total: usize, #[case] expected: u8) {
        assert_eq!(percent_of(current, total), expected);
    }

    #[test]
    fn reports_carry_the_task_id() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ProgressReporter::new(TaskId::new(9), move |id, p| sink.lock().push((id, p)));

        reporter.report(10);
        reporter.clone().report_fraction(1, 2);

        assert_eq!(*seen.lock(), vec![(TaskId::new(9), 10), (TaskId::new(9), 50)]);
    }
}
