//! Static asset resolution for the arena dashboard.
//!
//! Requests are resolved against an ordered [`MountTable`]: each [`Mount`]
//! binds a URL prefix to a directory, the first mount whose prefix matches
//! and which holds a regular file at the remaining path wins.
//!
//! Mount sources:
//!
//! - **Directory**: files are read from disk with `tokio::fs`
//! - **Embedded** (`embed` feature): the vendored framework assets under
//!   `web/vendor/miku` are compiled into the binary via `rust-embed`

#[cfg(feature = "embed")]
mod embedded;
mod mount;
mod path;

use std::borrow::Cow;

pub use mount::{Mount, MountSource, MountTable};
pub use path::{RequestPath, sanitize};

/// Error raised while resolving a request path.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The request path cannot be mapped safely onto a mount.
    #[error("Malformed request path: {0}")]
    Malformed(String),

    /// Filesystem failure other than absence or permission denial.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A resolved static file.
#[derive(Debug, Clone)]
pub struct Asset {
    /// File contents.
    pub content: Cow<'static, [u8]>,
    /// MIME type guessed from the file extension.
    pub content_type: &'static str,
}

/// Return the MIME type string for the given file path.
pub fn mime_for(path: &str) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}
