//! Pure domain logic behind the reporter

pub mod ci;
pub mod outcome;
pub mod rerun;
pub mod tcm;

pub use ci::resolve_ci_context;
pub use outcome::{resolve_outcome, OutcomeResolution};
pub use rerun::filter_items;
