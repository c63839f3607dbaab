//! Tab data structure
//!
//! Tabs display:
//! - Favicon
//! - Title (truncated)
//! - Loading indicator

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use veil_history::FaviconImage;

use crate::engine::WebEngine;

/// Longest title shown on a tab before it is cut
pub const MAX_TITLE_CHARS: usize = 30;
pub const UNTITLED: &str = "Untitled";
pub const LOADING_TITLE: &str = "Loading...";
pub const NEW_TAB_TITLE: &str = "New Tab";

/// Identifier of a tab, stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(Uuid);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Title as shown on the tab strip.
pub fn display_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let cut: String = title.chars().take(MAX_TITLE_CHARS).collect();
        format!("{}...", cut)
    } else if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

pub struct Tab {
    id: TabId,
    engine: Box<dyn WebEngine>,
    /// Display title, already truncated
    title: String,
    icon: Option<FaviconImage>,
    /// Last URL reported by the engine
    url: String,
    loading: bool,
}

impl Tab {
    pub(crate) fn new(engine: Box<dyn WebEngine>) -> Self {
        Self {
            id: TabId::new(),
            engine,
            title: NEW_TAB_TITLE.to_string(),
            icon: None,
            url: String::new(),
            loading: false,
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> Option<&FaviconImage> {
        self.icon.as_ref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn engine(&self) -> &dyn WebEngine {
        self.engine.as_ref()
    }

    pub(crate) fn engine_mut(&mut self) -> &mut dyn WebEngine {
        self.engine.as_mut()
    }

    pub(crate) fn set_title(&mut self, raw: &str) {
        self.title = display_title(raw);
    }

    pub(crate) fn set_icon(&mut self, icon: Option<FaviconImage>) {
        self.icon = icon;
    }

    pub(crate) fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Navigate this tab's engine
    pub(crate) fn navigate(&mut self, url: &str) {
        tracing::debug!(tab_id = %self.id, url = %url, "Navigating tab");
        self.engine.navigate(url);
        self.url = url.to_string();
    }

    pub(crate) fn release(mut self) {
        self.engine.shutdown();
        tracing::debug!(tab_id = %self.id, "Released tab engine");
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("url", &self.url)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_titles_are_kept() {
        assert_eq!(display_title("Rust"), "Rust");
        let exactly = "a".repeat(MAX_TITLE_CHARS);
        assert_eq!(display_title(&exactly), exactly);
    }

    #[test]
    fn test_long_titles_are_truncated() {
        let long = "The Rust Programming Language Book";
        assert_eq!(display_title(long), "The Rust Programming Language ...");
    }

    #[test]
    fn test_truncation_counts_characters() {
        let title = "é".repeat(40);
        let shown = display_title(&title);
        assert_eq!(shown.chars().count(), MAX_TITLE_CHARS + 3);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_empty_title_is_untitled() {
        assert_eq!(display_title(""), UNTITLED);
    }

    #[test]
    fn test_tab_ids_are_unique() {
        assert_ne!(TabId::new(), TabId::new());
    }
}
