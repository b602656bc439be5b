pub const APP_NAME: &str = "vgoroot";

/// Version of this crate, part of every virtual root's name and fingerprint.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the directory virtual roots live in.
pub const BASE_DIR_ENV: &str = "VGOROOT_DIR";

/// Prefix given to overlay files copied into a merged directory.
pub const OVERLAY_PREFIX: &str = "vgoroot__";

/// File inside a virtual root recording the fingerprint it was built from.
pub const STAMP_FILE: &str = ".vgoroot-stamp";

/// Buffer size for writing rewritten sources.
pub const WRITE_BUFFER_SIZE: usize = 10 * 1024;
