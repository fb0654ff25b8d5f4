//! Application state.
//!
//! Read-only state shared by all request handlers, built once at startup.

use std::path::{Path, PathBuf};

use arena_assets::{Mount, MountSource, MountTable};
use arena_config::MountsConfig;
use arena_tournament::Tournament;

use crate::{ServerConfig, StartupError};

/// URL prefix of the third-party framework assets.
pub(crate) const FRAMEWORK_PREFIX: &str = "/Miku";

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Static mounts in priority order.
    pub(crate) mounts: MountTable,
    /// Document served for every request no mount resolves.
    pub(crate) entry_point: PathBuf,
    /// Tournament cards (`None` when no data file is configured).
    pub(crate) tournaments: Option<Vec<Tournament>>,
}

impl AppState {
    /// Build state from server configuration, running startup checks.
    pub(crate) fn from_config(config: &ServerConfig) -> Result<Self, StartupError> {
        let entry_point = config.mounts.entry_point.clone();
        if !entry_point.is_file() {
            return Err(StartupError::EntryPointMissing(entry_point));
        }

        let tournaments = config
            .tournaments_file
            .as_deref()
            .map(arena_tournament::load_tournaments)
            .transpose()?;

        let mounts = dashboard_mounts(&config.mounts);
        for (prefix, dir) in missing_mount_dirs(&mounts) {
            let prefix = if prefix.is_empty() { "/" } else { prefix };
            tracing::warn!(prefix, dir = %dir.display(), "Mount directory does not exist");
        }

        Ok(Self {
            mounts,
            entry_point,
            tournaments,
        })
    }
}

/// Directory mounts whose root is not a directory. Requests under them fall
/// through, so this is only worth a warning.
fn missing_mount_dirs(mounts: &MountTable) -> Vec<(&str, &Path)> {
    mounts
        .iter()
        .filter_map(|mount| match mount.source() {
            MountSource::Dir(dir) if !dir.is_dir() => Some((mount.prefix(), dir.as_path())),
            _ => None,
        })
        .collect()
}

/// The dashboard mount table: prefixed mounts first, then the public root
/// again without a prefix for root-level files like `/favicon.ico`.
pub(crate) fn dashboard_mounts(mounts: &MountsConfig) -> MountTable {
    MountTable::new(vec![
        Mount::dir("/public", mounts.public_dir.clone()),
        Mount::dir("/pages", mounts.pages_dir.clone()),
        Mount::dir("/src", mounts.source_dir.clone()),
        framework_mount(mounts),
        Mount::dir("", mounts.public_dir.clone()),
    ])
}

#[cfg(not(feature = "embed"))]
fn framework_mount(mounts: &MountsConfig) -> Mount {
    Mount::dir(FRAMEWORK_PREFIX, mounts.framework_dir.clone())
}

#[cfg(feature = "embed")]
fn framework_mount(_mounts: &MountsConfig) -> Mount {
    Mount::embedded(FRAMEWORK_PREFIX)
}
