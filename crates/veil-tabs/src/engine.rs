//! Rendering engine seam
//!
//! The embedded engine is provided by the GUI layer. It renders pages and
//! reports what happened through [`EngineEvent`]s, which the shell feeds to
//! [`crate::TabManager::handle_event`] in the order the engine emitted them.

use veil_history::FaviconImage;

/// One rendering-engine instance, owned by exactly one tab.
pub trait WebEngine {
    fn navigate(&mut self, url: &str);
    fn go_back(&mut self);
    fn go_forward(&mut self);
    fn reload(&mut self);

    /// 1.0 is 100%
    fn set_zoom_fraction(&mut self, fraction: f64);

    fn current_url(&self) -> String;
    fn current_title(&self) -> String;
    fn current_icon(&self) -> Option<FaviconImage>;

    /// Release page resources. The instance is dropped right after.
    fn shutdown(&mut self) {}
}

/// Produces a fresh engine for every new tab.
pub trait EngineFactory {
    fn create(&mut self) -> Box<dyn WebEngine>;
}

impl<F> EngineFactory for F
where
    F: FnMut() -> Box<dyn WebEngine>,
{
    fn create(&mut self) -> Box<dyn WebEngine> {
        self()
    }
}

/// Lifecycle events emitted by an engine instance.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    TitleChanged(String),
    /// `None` when the page has no usable icon
    IconChanged(Option<FaviconImage>),
    UrlChanged(String),
    LoadStarted,
    LoadFinished,
}
