//! C4: cross-book routing of new orders, execution generation, and the
//! order-id registry that gives O(1) cancellation.

mod execution;
mod matching;
mod registry;

pub use execution::Execution;
pub use matching::{CancelOutcome, Engine, NewOrderRequest, SubmitOutcome, Trade};
