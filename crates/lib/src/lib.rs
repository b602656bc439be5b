//! vgoroot-lib: virtual library roots and archive files.
//!
//! This crate provides the core of a cross-compiling build shim:
//! - `goroot`: merging a vanilla source tree with an overlay of replacement
//!   sources into a virtual root, pruning the declarations the overlay replaces
//! - `syntax`: the top-level Go syntax the pruning works on
//! - `archive`: the `ar`-style container toolchains package objects in
//! - `vfs`: read-only source filesystems on disk and in memory

pub mod archive;
pub mod consts;
pub mod goroot;
pub mod platform;
pub mod syntax;
pub mod util;
pub mod vfs;
