//! DocFlow Engine
//!
//! The asynchronous job-processing core: a durable job record store, an
//! operation registry mapping job kinds to pluggable work functions, a
//! fixed pool of worker tasks, and the queue-manager facade the API layer
//! talks to.
//!
//! Architecture:
//! - Store: job records and every state-machine guard
//! - Registry: kind -> work function lookup
//! - Workers: claim job ids off a shared FIFO channel and drive them to a
//!   terminal state, persisting progress as it is reported
//! - Manager: enqueue, cancel, status and queue-health entry points, plus
//!   pool lifecycle
//!
//! The engine performs no admission validation; tier limits are enforced
//! once, before a job is ever created.

pub mod config;
pub mod error;
pub mod manager;
pub mod registry;
pub mod store;

mod worker;

pub use config::EngineConfig;
pub use error::{EngineError, StoreError};
pub use manager::QueueManager;
pub use registry::{Operation, OperationRegistry, PostProcess, ProgressSender};
pub use store::{CancelOutcome, JobStore, MemoryJobStore};
