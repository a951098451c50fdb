//! Remote image fetching and the process-wide brand logo cache.
//!
//! Fetching never fails loudly: any network error, non-success status,
//! timeout, oversize body or undecodable payload yields `None` and a
//! `log::warn`, and the caller draws a placeholder instead.

use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

use crate::config::ReportConfig;

/// An image validated by decoding and stored as a base64 data URI, the form
/// [`Surface::draw_image`](crate::surface::Surface::draw_image) accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data_uri: String,
    pub width_px: u32,
    pub height_px: u32,
}

impl EncodedImage {
    /// Largest `(w, h)` with the image's aspect ratio inside a `box_w × box_h` box.
    pub fn fit_within(&self, box_w: f32, box_h: f32) -> (f32, f32) {
        if self.width_px == 0 || self.height_px == 0 {
            return (box_w, box_h);
        }
        let scale = (box_w / self.width_px as f32).min(box_h / self.height_px as f32);
        (self.width_px as f32 * scale, self.height_px as f32 * scale)
    }
}

/// Validate raw image bytes and wrap them as a data URI.
pub fn encode_image(bytes: &[u8]) -> Option<EncodedImage> {
    let format = match ::image::guess_format(bytes) {
        Ok(f) => f,
        Err(e) => {
            log::warn!("image: unrecognised format: {e}");
            return None;
        }
    };
    let decoded = match ::image::load_from_memory_with_format(bytes, format) {
        Ok(img) => img,
        Err(e) => {
            log::warn!("image: decode error: {e}");
            return None;
        }
    };
    Some(EncodedImage {
        data_uri: format!(
            "data:{};base64,{}",
            format.to_mime_type(),
            BASE64_STD.encode(bytes)
        ),
        width_px: decoded.width(),
        height_px: decoded.height(),
    })
}

/// Anything that can turn a URL into an embeddable image.
pub trait ImageSource: Send + Sync {
    fn fetch(&self, url: &str) -> Option<EncodedImage>;
}

/// Blocking HTTP fetcher with a bounded timeout.
pub struct HttpImageFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration, max_bytes: u64) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            max_bytes,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(
            Duration::from_millis(config.image_timeout_ms),
            config.image_max_bytes,
        )
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| format!("request failed: {e}"))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(self.max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| format!("failed to read body: {e}"))?;

        if bytes.len() as u64 > self.max_bytes {
            return Err(format!("body exceeds {} bytes", self.max_bytes));
        }
        Ok(bytes)
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

impl ImageSource for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Option<EncodedImage> {
        match self.download(url) {
            Ok(bytes) => {
                let encoded = encode_image(&bytes);
                if encoded.is_some() {
                    log::debug!("image: fetched {} bytes from {url}", bytes.len());
                }
                encoded
            }
            Err(e) => {
                log::warn!("image: {url}: {e}");
                None
            }
        }
    }
}

/// Single-assignment cache for the brand logo.
///
/// The first caller that finds it empty fetches outside any lock and then
/// tries to store the result; a concurrent first caller's result is simply
/// discarded. Failed fetches are not stored, so a later report retries.
pub struct LogoCache {
    cell: OnceLock<EncodedImage>,
}

impl LogoCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn ensure_loaded(&self, source: &dyn ImageSource, url: Option<&str>) -> Option<&EncodedImage> {
        if let Some(logo) = self.cell.get() {
            return Some(logo);
        }
        let fetched = source.fetch(url?)?;
        if self.cell.set(fetched).is_err() {
            log::debug!("logo cache: already populated by a concurrent report");
        }
        self.cell.get()
    }
}

impl Default for LogoCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide logo shared by every report.
pub static BRAND_LOGO: LogoCache = LogoCache::new();
