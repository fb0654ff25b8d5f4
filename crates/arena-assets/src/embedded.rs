//! Framework assets vendored into the binary at build time.

use crate::{Asset, mime_for};

#[derive(rust_embed::RustEmbed)]
#[folder = "../../web/vendor/miku"]
struct FrameworkAssets;

/// Look up an embedded framework asset by its path below the mount prefix.
pub(crate) fn get(path: &str) -> Option<Asset> {
    FrameworkAssets::get(path).map(|file| Asset {
        content: file.data,
        content_type: mime_for(path),
    })
}
