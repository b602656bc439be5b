mod archive_tests;
mod common;
mod merge_tests;
mod vroot_tests;
