//! Virtual library roots.
//!
//! This module builds a synthetic library root from an unmodified ("vanilla")
//! tree and a smaller overlay of replacement sources:
//! - `filter`: collecting and pruning top-level symbols of one source file
//! - `process`: loading, transforming and writing one source file
//! - `file_filter`: allow-lists of vanilla files per package
//! - `merger`: the concurrent recursive merge of two trees
//! - `vroot`: fingerprinted virtual roots in a well-known location

pub mod file_filter;
pub mod filter;
pub mod merger;
pub mod process;
pub mod types;
pub mod vroot;

pub use file_filter::{FileFilter, FileFilterTable, include_only, only_go_sources};
pub use filter::SymbolFilter;
pub use merger::{Merger, ROOT, is_linked, merge};
pub use process::{Outcome, ProcessError, process_source};
pub use types::{MergeConfig, MergeError, MergeStats};
pub use vroot::{BuiltRoot, VirtualRoot, VirtualRootConfig, VirtualRootError};
