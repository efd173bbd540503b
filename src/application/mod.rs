//! Application layer - use cases and orchestration.
//!
//! This layer contains the quote store, the presenter that renders it and
//! the agent that syncs it with a remote endpoint.

pub mod presenter;
pub mod quote_store;
pub mod sync_agent;

pub use presenter::{pick_random, OutputFormat, Presenter};
pub use quote_store::QuoteStore;
pub use sync_agent::{SyncAgent, TickOutcome};
