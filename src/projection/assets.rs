//! Image assets referenced by content plans.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::AssetLoadError;

/// Raw bytes of an image plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Asset {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }
}

/// Source of named assets.
pub trait AssetLoader {
    fn load(&self, name: &str) -> Result<Asset, AssetLoadError>;
}

/// Assets fetched up front, keyed by name.
///
/// The browser facade fills a bundle asynchronously before projecting, so
/// projection itself never waits on I/O.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetBundle {
    assets: BTreeMap<String, Asset>,
}

impl AssetBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, asset: Asset) {
        self.assets.insert(name.into(), asset);
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetLoader for AssetBundle {
    fn load(&self, name: &str) -> Result<Asset, AssetLoadError> {
        self.assets
            .get(name)
            .cloned()
            .ok_or_else(|| AssetLoadError::NotFound(name.to_string()))
    }
}

/// Loads assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssetLoader {
    root: PathBuf,
}

impl DirAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for DirAssetLoader {
    fn load(&self, name: &str) -> Result<Asset, AssetLoadError> {
        let path = self.root.join(name);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Asset::new(mime_for(name), bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetLoadError::NotFound(name.to_string()))
            }
            Err(e) => Err(AssetLoadError::Fetch {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// MIME type from a file name's extension.
pub fn mime_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
