//! Veil Browsing State
//!
//! Two ledgers are written from rendering-engine events:
//! - history: one bucket per local calendar date, one entry per canonical URL
//!   within a bucket, each visit appended as an epoch timestamp
//! - favicons: one record per domain, keyed by a short hash of the domain
//!
//! Both derive the domain and favicon key through [`canonical`] so that a
//! history entry always points at the favicon record of its own domain.

pub mod canonical;
mod error;
mod favicon;
mod history;

pub use canonical::{canonicalize_url, domain_of, favicon_id, PageKey};
pub use error::HistoryError;
pub use favicon::{FaviconCache, FaviconDocument, FaviconImage, FaviconRecord, FaviconStatus};
pub use history::{HistoryDocument, HistoryEntry, HistoryLedger};

pub type Result<T> = std::result::Result<T, HistoryError>;
