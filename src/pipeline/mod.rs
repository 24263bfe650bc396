//! Pipeline entry points.
//!
//! - `run_collection`: Collect every state and persist the records
//! - `run_validate`: Check configuration before a run

pub mod collect;
pub mod validate;

pub use collect::{CancelToken, CollectionOutcome, collect_states, run_collection};
pub use validate::run_validate;
