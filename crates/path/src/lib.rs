//! Client-side path construction (§4.5): random hop selection from the node DB, LR_CommitMessage
//! onion-frame construction, and the per-client path pool scheduler.

mod build;
mod error;
mod pathset;
mod select;

pub use build::{build_commit, Commit};
pub use error::{PathError, Result};
pub use pathset::{PathEntry, PathSet};
pub use select::{select_diverse_paths, select_hops};
