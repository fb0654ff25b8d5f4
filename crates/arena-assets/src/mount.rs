//! Ordered mount table.

use std::borrow::Cow;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::path::sanitize;
use crate::{Asset, ResolveError, mime_for};

/// Where a mount reads its files from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountSource {
    /// Files under a directory on disk.
    Dir(PathBuf),
    /// Framework assets compiled into the binary.
    #[cfg(feature = "embed")]
    Embedded,
}

impl fmt::Display for MountSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dir(dir) => write!(f, "{}", dir.display()),
            #[cfg(feature = "embed")]
            Self::Embedded => f.write_str("<embedded>"),
        }
    }
}

/// A binding of a URL prefix to a file source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    prefix: String,
    prefix_segments: Vec<String>,
    source: MountSource,
}

impl Mount {
    /// Mount `dir` under `prefix` (e.g. `/public`, or `""` for the site root).
    pub fn dir(prefix: &str, dir: impl Into<PathBuf>) -> Self {
        Self::new(prefix, MountSource::Dir(dir.into()))
    }

    /// Mount the embedded framework assets under `prefix`.
    #[cfg(feature = "embed")]
    pub fn embedded(prefix: &str) -> Self {
        Self::new(prefix, MountSource::Embedded)
    }

    fn new(prefix: &str, source: MountSource) -> Self {
        let prefix_segments = prefix
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        Self {
            prefix: prefix.trim_end_matches('/').to_owned(),
            prefix_segments,
            source,
        }
    }

    /// URL prefix without trailing slash (`""` for the root mount).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Backing source.
    pub fn source(&self) -> &MountSource {
        &self.source
    }

    /// Read the file at `rest` (segments below the prefix).
    async fn read(&self, rest: &[String]) -> Result<Option<Asset>, ResolveError> {
        match &self.source {
            MountSource::Dir(root) => read_file_under(root, rest).await,
            #[cfg(feature = "embed")]
            MountSource::Embedded => Ok(crate::embedded::get(&rest.join("/"))),
        }
    }
}

/// Mounts evaluated in declaration order; first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountTable {
    mounts: Vec<Mount>,
}

impl MountTable {
    /// Create a table from mounts in priority order.
    pub fn new(mounts: Vec<Mount>) -> Self {
        Self { mounts }
    }

    /// Mounts in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Mount> {
        self.mounts.iter()
    }

    /// Resolve a request path to the first matching file.
    ///
    /// Returns `Ok(None)` when no mount holds a regular file at the path;
    /// the caller decides what to serve instead.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Malformed`] before touching the filesystem if
    /// the path is unsafe, and [`ResolveError::Io`] for filesystem failures
    /// other than absence or permission denial.
    pub async fn resolve(&self, request_path: &str) -> Result<Option<Asset>, ResolveError> {
        let path = sanitize(request_path)?;

        for mount in &self.mounts {
            let Some(rest) = path.strip_prefix(&mount.prefix_segments) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            if let Some(asset) = mount.read(rest).await? {
                tracing::debug!(path = request_path, mount = %mount.prefix, "Resolved static asset");
                return Ok(Some(asset));
            }
        }

        Ok(None)
    }
}

/// Read a regular file at `root/rest...`, refusing anything that escapes `root`.
async fn read_file_under(root: &Path, rest: &[String]) -> Result<Option<Asset>, ResolveError> {
    let candidate = rest.iter().fold(root.to_path_buf(), |p, s| p.join(s));

    let Some(root) = soft(tokio::fs::canonicalize(root).await, root)? else {
        return Ok(None);
    };
    let Some(resolved) = soft(tokio::fs::canonicalize(&candidate).await, &candidate)? else {
        return Ok(None);
    };

    // Symlinks may point outside the mount
    if !resolved.starts_with(&root) {
        tracing::warn!(path = %candidate.display(), "Refusing file outside mount root");
        return Ok(None);
    }

    let Some(metadata) = soft(tokio::fs::metadata(&resolved).await, &resolved)? else {
        return Ok(None);
    };
    if !metadata.is_file() {
        return Ok(None);
    }

    let Some(content) = soft(tokio::fs::read(&resolved).await, &resolved)? else {
        return Ok(None);
    };

    let name = rest.last().map_or("", String::as_str);
    Ok(Some(Asset {
        content: Cow::Owned(content),
        content_type: mime_for(name),
    }))
}

/// Map absence, unrepresentable names and permission denial to `None`, keep
/// other errors.
fn soft<T>(result: std::io::Result<T>, path: &Path) -> Result<Option<T>, ResolveError> {
    match result {
        Ok(value) => Ok(Some(value)),
        // Names the filesystem cannot hold (ENAMETOOLONG) cannot exist either
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::NotFound | ErrorKind::NotADirectory | ErrorKind::InvalidFilename
            ) =>
        {
            Ok(None)
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            tracing::warn!(path = %path.display(), "Permission denied reading static asset");
            Ok(None)
        }
        Err(e) => Err(ResolveError::Io(e)),
    }
}
