//! Logo uploads.
//!
//! A logo is stored before its card record is created; the URL returned by
//! [`StorageService::upload`] becomes the record's `logo_url`.

use crate::rendering::logo::LogoSource;
use crate::{Error, Result};
use std::path::PathBuf;

pub trait StorageService: Send + Sync {
    /// Store `bytes` under `filename` and return the URL it can be fetched from
    fn upload(&self, bytes: &[u8], filename: &str, content_type: &str) -> Result<String>;
}

/// Reduce an uploaded filename to a safe, flat name.
///
/// Keeps ASCII letters, digits, `.`, `-` and `_`; whitespace becomes `_`;
/// everything else, including path separators, is dropped.
pub fn sanitize_filename(name: &str) -> Result<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_start_matches(['.', '_']).to_string();
    if cleaned.is_empty() {
        return Err(Error::StorageError(format!("unusable filename {:?}", name)));
    }
    Ok(cleaned)
}

/// Stores uploads in a local directory served back under `<public_base>/logos/`
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let public_base = public_base.into().trim_end_matches('/').to_string();
        Ok(Self { root, public_base })
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}/logos/{}", self.public_base, name)
    }

    /// Stored name behind `url`, if the URL points into this storage
    pub fn local_name<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.public_base.as_str())?
            .strip_prefix("/logos/")
            .filter(|name| !name.is_empty() && !name.contains('/'))
    }

    /// Read a stored file back with its MIME type, if it exists
    pub fn open(&self, name: &str) -> Result<Option<(Vec<u8>, &'static str)>> {
        let name = sanitize_filename(name)?;
        let path = self.root.join(&name);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        let mime = image::ImageFormat::from_path(&path)
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream");
        Ok(Some((bytes, mime)))
    }
}

impl StorageService for LocalStorage {
    fn upload(&self, bytes: &[u8], filename: &str, content_type: &str) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::StorageError("empty upload".into()));
        }
        let name = sanitize_filename(filename)?;
        std::fs::write(self.root.join(&name), bytes)
            .map_err(|e| Error::StorageError(format!("failed to write {}: {}", name, e)))?;
        log::info!("stored {} ({} bytes, {})", name, bytes.len(), content_type);
        Ok(self.url_for(&name))
    }
}

/// Resolves URLs of uploaded logos from disk and hands every other URL to `remote`
pub struct LocalLogoSource {
    storage: LocalStorage,
    remote: Box<dyn LogoSource>,
}

impl LocalLogoSource {
    pub fn new(storage: LocalStorage, remote: Box<dyn LogoSource>) -> Self {
        Self { storage, remote }
    }
}

impl LogoSource for LocalLogoSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let Some(name) = self.storage.local_name(url) else {
            return self.remote.fetch(url);
        };
        match self.storage.open(name)? {
            Some((bytes, _)) => Ok(bytes),
            None => Err(Error::StorageError(format!("no stored logo named {}", name))),
        }
    }
}
