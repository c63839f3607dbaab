//! Input resolution for the address bar
//!
//! 1. Text with a scheme → navigate as typed
//! 2. Dotted text without spaces → navigate over https
//! 3. Anything else → search

use url::form_urlencoded;
use url::Url;

/// Result of resolving address bar input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResolution {
    Navigate(String),
    /// Search results page for the typed text
    Search(String),
}

impl InputResolution {
    /// The URL to load either way
    pub fn url(&self) -> &str {
        match self {
            Self::Navigate(url) | Self::Search(url) => url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputResolver {
    /// Search engine URL template (%s replaced with query)
    search_template: String,
    homepage: String,
}

impl InputResolver {
    pub fn new(search_template: impl Into<String>, homepage: impl Into<String>) -> Self {
        Self {
            search_template: search_template.into(),
            homepage: homepage.into(),
        }
    }

    pub fn set_search_engine(&mut self, template: String) {
        self.search_template = template;
    }

    pub fn search_template(&self) -> &str {
        &self.search_template
    }

    pub fn resolve(&self, input: &str) -> InputResolution {
        let input = input.trim();

        if input.is_empty() {
            return InputResolution::Navigate(self.homepage.clone());
        }

        if Url::parse(input).is_ok() {
            return InputResolution::Navigate(input.to_string());
        }

        if input.contains('.') && !input.contains(' ') {
            return InputResolution::Navigate(format!("https://{}", input));
        }

        InputResolution::Search(self.build_search_url(input))
    }

    fn build_search_url(&self, query: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.search_template.replace("%s", &encoded)
    }
}
