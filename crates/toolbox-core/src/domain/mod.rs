//! Domain model (ids, task record, state machine, events, outcomes, errors).

pub mod errors;
pub mod events;
pub mod ids;
pub mod outcome;
pub mod state;
pub mod task;

pub use self::errors::{HandlerError, TransitionError};
pub use self::events::TaskEvent;
pub use self::ids::{IdSequence, TaskId};
pub use self::outcome::{ErrorDetail, TaskReport};
pub use self::state::TaskStatus;
pub use self::task::{Task, TaskType};
