mod archive_tests;
mod common;
mod merge_tests;
mod prune_tests;
