mod archive;
mod merge;
mod vroot;

pub use archive::{cmd_ar_create, cmd_ar_extract, cmd_ar_list};
pub use merge::cmd_merge;
pub use vroot::{VrootArgs, cmd_vroot};
