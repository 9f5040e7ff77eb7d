//! Cardforge
//!
//! A business-card composition engine: given a [`CardRecord`] and an optional
//! remote logo it renders a fixed 1063x591 RGB card and encodes it as PNG.
//!
//! # Features
//!
//! - **http** (default): fetches logos over HTTP(S) with a bounded timeout
//! - **server** (default): a small `tiny_http` front end storing records and
//!   logo uploads and serving rendered cards
//!
//! # Example
//!
//! ```no_run
//! use cardforge::{CardRecord, CardRenderer, RendererConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let renderer = CardRenderer::new(RendererConfig::default())?;
//! let record = CardRecord {
//!     name: "Lee".to_string(),
//!     phone: Some("010-1234-5678".to_string()),
//!     ..Default::default()
//! };
//! let png = renderer.render(&record)?;
//! std::fs::write("card.png", png)?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod error;
pub use error::{Error, Result};

pub mod rendering;
pub use rendering::fonts::FontSet;
pub use rendering::logo::{LogoSource, StaticLogoSource};
pub use rendering::CardRenderer;

#[cfg(feature = "http")]
pub use rendering::logo::HttpLogoSource;

// Record persistence and logo uploads used by the HTTP front end
pub mod storage;
pub mod store;

#[cfg(feature = "server")]
pub mod server;

/// Contact data used as rendering input.
///
/// Only `name` is required. Missing optional fields render as empty strings
/// at their fixed positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl CardRecord {
    /// Logo URL if present and non-blank
    pub fn logo(&self) -> Option<&str> {
        self.logo_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

/// Configuration for a [`CardRenderer`]
///
/// The defaults point at the fonts bundled under `assets/fonts` and give
/// logo fetches a ten second budget. The default font paths are relative,
/// so they resolve against the process working directory; set absolute
/// paths when running from anywhere other than the crate root.
///
/// # Examples
///
/// ```
/// let cfg = cardforge::RendererConfig::default();
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// User agent string sent with logo requests
    pub user_agent: String,
    /// Timeout for a single logo fetch in milliseconds
    pub logo_timeout_ms: u64,
    /// Logo bodies larger than this are rejected
    pub max_logo_bytes: u64,
    /// Whether to fetch and composite logos at all
    pub enable_logos: bool,
    /// Font used for the name line; a relative path resolves against the working directory
    pub bold_font: PathBuf,
    /// Font used for the title and contact lines; relative like `bold_font`
    pub regular_font: PathBuf,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("cardforge/{}", env!("CARGO_PKG_VERSION")),
            logo_timeout_ms: 10_000,
            max_logo_bytes: 10 * 1024 * 1024,
            enable_logos: true,
            bold_font: PathBuf::from("assets/fonts/DejaVuSans-Bold.ttf"),
            regular_font: PathBuf::from("assets/fonts/DejaVuSans.ttf"),
        }
    }
}

impl RendererConfig {
    pub fn validate(&self) -> Result<()> {
        if self.logo_timeout_ms == 0 {
            return Err(Error::ConfigError("logo_timeout_ms must be greater than zero".into()));
        }
        if self.max_logo_bytes == 0 {
            return Err(Error::ConfigError("max_logo_bytes must be greater than zero".into()));
        }
        Ok(())
    }
}
