//! rota-core
//!
//! Lease-based, multi-queue job dispatcher kept entirely in memory.
//!
//! Producers `add` jobs tagged with a task id and a queue id. Consumers `pull`
//! jobs round-robin across queues; a pulled job stays out of circulation until
//! its lease runs out or it is `remove`d.
//!
//! # Modules
//! - **domain**: ids, job record, read-only views, errors
//! - **ports**: the `Clock` seam (system clock, manual clock for tests)
//! - **queue**: ordered lease map, revertible cursor, per-queue lease walk
//! - **store**: the indices (`StoreState`) behind one lock (`JobStore`)
//! - **realm**: named, independent stores
//! - **config**: payload and lease tunables

pub mod config;
pub mod domain;
pub mod ports;
pub mod queue;
pub mod realm;
pub mod store;

pub use config::StoreConfig;
pub use domain::{JobId, JobView, QueueId, StoreError, StoreStatus, TaskId, TaskStatus};
pub use realm::Realms;
pub use store::{JobStore, LeasedJob};
