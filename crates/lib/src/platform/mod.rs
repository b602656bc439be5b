pub mod link;
pub mod paths;

pub use link::{link_dir, link_file};
pub use paths::base_dir;
