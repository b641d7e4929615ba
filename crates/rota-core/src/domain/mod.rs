//! Domain model (IDs, job records, views, errors).

pub mod errors;
pub mod ids;
pub mod job;
pub mod status;

pub use self::errors::{Result, StoreError};
pub use self::ids::{JobId, QueueId, TaskId};
pub use self::job::JobRecord;
pub use self::status::{JobView, QueueLease, StoreStatus, TaskStatus};
