//! Favicon cache
//!
//! One record per domain. Once a domain has a loaded icon the record is
//! frozen: neither a later pending observation nor a later icon replaces it,
//! so a slow placeholder can never clobber a good icon that raced ahead.

use base64::engine::general_purpose::STANDARD as Base64Standard;
use base64::Engine;
use chrono::{DateTime, Local, NaiveDateTime};
use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

use veil_storage::{load_json, save_json, DocumentStore};

use crate::canonical::PageKey;
use crate::Result;

const FAVICON_DOCUMENT: &str = "favicons";
/// Icons are stored no larger than the tab strip renders them
const ICON_SIZE: u32 = 24;

/// Encoded icon bytes as delivered by the rendering engine (PNG, ICO, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaviconImage {
    bytes: Vec<u8>,
}

impl FaviconImage {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Scale down to at most 24x24 and re-encode as a PNG data URI.
    pub fn to_data_uri(&self) -> std::result::Result<String, image::ImageError> {
        let img = image::load_from_memory(&self.bytes)?;

        let (width, height) = img.dimensions();
        let img = if width > ICON_SIZE || height > ICON_SIZE {
            img.resize(ICON_SIZE, ICON_SIZE, FilterType::Lanczos3)
        } else {
            img
        };

        let mut output = Cursor::new(Vec::new());
        img.write_to(&mut output, ImageFormat::Png)?;

        Ok(format!(
            "data:image/png;base64,{}",
            Base64Standard.encode(output.into_inner())
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaviconStatus {
    /// Page seen, icon not available yet
    Pending,
    /// Icon data stored
    Loaded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaviconRecord {
    pub domain: String,
    /// `data:image/png;base64,...`
    pub icon_data: Option<String>,
    /// Local time of the last icon write
    pub last_updated: Option<NaiveDateTime>,
    pub status: FaviconStatus,
}

impl FaviconRecord {
    fn pending(domain: String) -> Self {
        Self {
            domain,
            icon_data: None,
            last_updated: None,
            status: FaviconStatus::Pending,
        }
    }

    fn loaded(domain: String, icon_data: String, now: &DateTime<Local>) -> Self {
        Self {
            domain,
            icon_data: Some(icon_data),
            last_updated: Some(now.naive_local()),
            status: FaviconStatus::Loaded,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status == FaviconStatus::Loaded
    }
}

/// All favicon records keyed by favicon id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaviconDocument {
    records: BTreeMap<String, FaviconRecord>,
}

impl FaviconDocument {
    pub fn get(&self, favicon_id: &str) -> Option<&FaviconRecord> {
        self.records.get(favicon_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FaviconRecord)> {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    /// Apply one icon observation for a page, then drop host-less records.
    ///
    /// Returns whether the record under this page's key was written.
    pub fn observe(
        &mut self,
        raw_url: &str,
        icon: Option<&FaviconImage>,
        now: &DateTime<Local>,
    ) -> bool {
        let key = PageKey::from_url(raw_url);

        let writable = self
            .records
            .get(&key.favicon_id)
            .map_or(true, |existing| !existing.is_loaded());

        if writable {
            let record = match icon.filter(|icon| !icon.is_empty()) {
                None => FaviconRecord::pending(key.domain.clone()),
                Some(icon) => match icon.to_data_uri() {
                    Ok(data) => FaviconRecord::loaded(key.domain.clone(), data, now),
                    Err(e) => {
                        tracing::warn!(domain = %key.domain, error = %e, "Favicon could not be encoded");
                        FaviconRecord::pending(key.domain.clone())
                    }
                },
            };
            self.records.insert(key.favicon_id, record);
        }

        self.purge_empty_domains();
        writable
    }

    fn purge_empty_domains(&mut self) {
        self.records.retain(|_, record| !record.domain.is_empty());
    }
}

/// Persistent domain-keyed favicon cache.
#[derive(Clone)]
pub struct FaviconCache {
    store: Arc<dyn DocumentStore>,
}

impl FaviconCache {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Read every record. A cache that was never written is empty.
    pub fn load(&self) -> Result<FaviconDocument> {
        Ok(load_json(self.store.as_ref(), FAVICON_DOCUMENT)?)
    }

    pub fn get(&self, favicon_id: &str) -> Result<Option<FaviconRecord>> {
        Ok(self.load()?.get(favicon_id).cloned())
    }

    /// Record an icon observation for a page at the current time.
    pub fn record_icon(
        &self,
        raw_url: &str,
        icon: Option<&FaviconImage>,
    ) -> Result<Option<FaviconRecord>> {
        self.record_icon_at(raw_url, icon, Local::now())
    }

    /// Record an icon observation for a page.
    ///
    /// Returns the record now stored for the page's domain, or `None` when
    /// the page has no host and nothing is kept for it.
    pub fn record_icon_at(
        &self,
        raw_url: &str,
        icon: Option<&FaviconImage>,
        now: DateTime<Local>,
    ) -> Result<Option<FaviconRecord>> {
        let mut document = self.load()?;
        let written = document.observe(raw_url, icon, &now);
        save_json(self.store.as_ref(), FAVICON_DOCUMENT, &document)?;

        let favicon_id = PageKey::from_url(raw_url).favicon_id;
        let record = document.get(&favicon_id).cloned();

        tracing::debug!(
            favicon_id = %favicon_id,
            written,
            status = ?record.as_ref().map(|r| r.status),
            "Recorded favicon"
        );

        Ok(record)
    }
}
