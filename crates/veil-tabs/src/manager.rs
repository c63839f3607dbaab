//! Tab Manager
//!
//! Owns the ordered tab strip and the active selection, and turns engine
//! events into history/favicon writes and shell notifications.

use chrono::Local;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use veil_history::{FaviconCache, FaviconImage, HistoryLedger};

use crate::engine::{EngineEvent, EngineFactory, WebEngine};
use crate::error::TabError;
use crate::tab::{Tab, TabId, LOADING_TITLE};
use crate::Result;

/// Tab behaviour taken from the user configuration
#[derive(Debug, Clone)]
pub struct TabSettings {
    pub homepage: String,
    /// Closing the last tab removes it instead of resetting it to the homepage
    pub close_after_last_tab: bool,
}

/// Messages from the tab manager to the window shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellNotice {
    /// The address bar should show this URL
    ActiveUrlChanged(String),
    /// The window's last tab was removed; the window decides whether to exit
    LastTabClosed,
    /// History or favicon state could not be saved
    StorageWarning(String),
}

pub struct TabManager {
    tabs: Vec<Tab>,
    /// Index into `tabs`
    active: Option<usize>,
    settings: TabSettings,
    history: HistoryLedger,
    favicons: FaviconCache,
    engines: Box<dyn EngineFactory>,
    notices: UnboundedSender<ShellNotice>,
}

impl TabManager {
    /// Create an empty manager and the receiving end of its notifications.
    pub fn new(
        settings: TabSettings,
        history: HistoryLedger,
        favicons: FaviconCache,
        engines: Box<dyn EngineFactory>,
    ) -> (Self, UnboundedReceiver<ShellNotice>) {
        let (notices, receiver) = mpsc::unbounded_channel();

        let manager = Self {
            tabs: Vec::new(),
            active: None,
            settings,
            history,
            favicons,
            engines,
            notices,
        };

        (manager, receiver)
    }

    pub fn settings(&self) -> &TabSettings {
        &self.settings
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn favicons(&self) -> &FaviconCache {
        &self.favicons
    }

    // === Tab strip ===

    /// Open a tab at the end of the strip and make it active.
    ///
    /// Without a URL the tab loads the configured homepage.
    pub fn create_tab(&mut self, url: Option<&str>) -> TabId {
        let mut tab = Tab::new(self.engines.create());
        let id = tab.id();

        let target = match url {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => self.settings.homepage.clone(),
        };
        tab.navigate(&target);

        self.tabs.push(tab);
        tracing::info!(tab_id = %id, url = %target, count = self.tabs.len(), "Created new tab");

        self.set_active_index(self.tabs.len() - 1);
        id
    }

    /// Close a tab by id. Unknown ids are ignored.
    pub fn close_tab(&mut self, id: &TabId) {
        match self.index_of(id) {
            Some(index) => self.close_tab_at(index),
            None => tracing::debug!(tab_id = %id, "Close requested for unknown tab"),
        }
    }

    /// Close the tab at a strip position. Out-of-range positions are ignored.
    pub fn close_tab_at(&mut self, index: usize) {
        if index >= self.tabs.len() {
            tracing::debug!(index, "Close requested for missing tab index");
            return;
        }

        if self.tabs.len() == 1 {
            if !self.settings.close_after_last_tab {
                let homepage = self.settings.homepage.clone();
                self.tabs[index].navigate(&homepage);
                tracing::info!(url = %homepage, "Last tab kept open and reset to homepage");
                return;
            }

            let tab = self.tabs.remove(index);
            let id = tab.id();
            tab.release();
            self.active = None;

            tracing::info!(tab_id = %id, "Closed last tab");
            self.notify(ShellNotice::LastTabClosed);
            return;
        }

        let tab = self.tabs.remove(index);
        let id = tab.id();
        tab.release();
        tracing::info!(tab_id = %id, count = self.tabs.len(), "Closed tab");

        match self.active {
            Some(active) if active == index => {
                // Selection moves to the right neighbour, or left at the end of the strip
                let next = index.min(self.tabs.len() - 1);
                self.set_active_index(next);
            }
            Some(active) if active > index => {
                self.active = Some(active - 1);
            }
            _ => {}
        }
    }

    /// Make a tab the active one. Unknown ids are ignored.
    pub fn activate(&mut self, id: &TabId) {
        if let Some(index) = self.index_of(id) {
            self.set_active_index(index);
        }
    }

    /// Make the tab at a strip position active. Out-of-range positions are ignored.
    pub fn activate_at(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.set_active_index(index);
        }
    }

    /// Activate the tab to the right, wrapping to the first.
    pub fn next_tab(&mut self) {
        if let Some(active) = self.active {
            self.set_active_index((active + 1) % self.tabs.len());
        }
    }

    /// Activate the tab to the left, wrapping to the last.
    pub fn previous_tab(&mut self) {
        if let Some(active) = self.active {
            let count = self.tabs.len();
            self.set_active_index((active + count - 1) % count);
        }
    }

    fn set_active_index(&mut self, index: usize) {
        self.active = Some(index);
        let tab = &self.tabs[index];
        tracing::debug!(tab_id = %tab.id(), index, "Activated tab");

        let url = tab.engine().current_url();
        self.notify(ShellNotice::ActiveUrlChanged(url));
    }

    // === Queries ===

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active.and_then(|index| self.tabs.get(index))
    }

    pub fn active_tab_id(&self) -> Option<TabId> {
        self.active_tab().map(Tab::id)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn tab(&self, id: &TabId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id() == *id)
    }

    /// Tabs in strip order
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn index_of(&self, id: &TabId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id() == *id)
    }

    /// Engine of a tab, for shell features that talk to it directly (devtools).
    pub fn engine(&self, id: &TabId) -> Result<&dyn WebEngine> {
        self.tab(id)
            .map(Tab::engine)
            .ok_or(TabError::NotFound(*id))
    }

    // === Active tab navigation ===

    fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        match self.active {
            Some(index) => self.tabs.get_mut(index),
            None => None,
        }
    }

    pub fn navigate_active(&mut self, url: &str) {
        if let Some(tab) = self.active_tab_mut() {
            tab.navigate(url);
        }
    }

    pub fn go_back(&mut self) {
        if let Some(tab) = self.active_tab_mut() {
            tab.engine_mut().go_back();
        }
    }

    pub fn go_forward(&mut self) {
        if let Some(tab) = self.active_tab_mut() {
            tab.engine_mut().go_forward();
        }
    }

    pub fn reload(&mut self) {
        if let Some(tab) = self.active_tab_mut() {
            tab.engine_mut().reload();
        }
    }

    /// Apply a zoom percentage to the active tab.
    pub fn set_zoom(&mut self, percentage: u32) {
        if let Some(tab) = self.active_tab_mut() {
            tab.engine_mut()
                .set_zoom_fraction(f64::from(percentage) / 100.0);
            tracing::debug!(tab_id = %tab.id(), percentage, "Applied zoom");
        }
    }

    // === Engine events ===

    /// Route one engine event. Events for tabs that are already closed are dropped.
    pub fn handle_event(&mut self, id: &TabId, event: EngineEvent) {
        let Some(index) = self.index_of(id) else {
            tracing::debug!(tab_id = %id, event = ?event, "Dropping event for closed tab");
            return;
        };

        match event {
            EngineEvent::TitleChanged(title) => {
                self.tabs[index].set_title(&title);
            }
            EngineEvent::LoadStarted => {
                let tab = &mut self.tabs[index];
                tab.set_loading(true);
                tab.set_title(LOADING_TITLE);
            }
            EngineEvent::IconChanged(icon) => {
                self.on_icon_changed(index, icon);
            }
            EngineEvent::UrlChanged(url) => {
                self.tabs[index].set_url(&url);
                if self.active == Some(index) {
                    self.notify(ShellNotice::ActiveUrlChanged(url));
                }
            }
            EngineEvent::LoadFinished => {
                self.on_load_finished(index);
            }
        }
    }

    fn on_icon_changed(&mut self, index: usize, icon: Option<FaviconImage>) {
        let tab = &mut self.tabs[index];
        let icon = icon.or_else(|| tab.engine().current_icon());
        tab.set_icon(icon.clone());

        let url = tab.engine().current_url();
        let result = self.favicons.record_icon(&url, icon.as_ref());
        self.report_storage(result.map(|_| ()).map_err(TabError::from));
    }

    fn on_load_finished(&mut self, index: usize) {
        let tab = &mut self.tabs[index];
        let title = tab.engine().current_title();
        let url = tab.engine().current_url();

        tab.set_loading(false);
        tab.set_title(&title);

        let result = self.history.record_visit(&url, &title, Local::now());
        self.report_storage(result.map(|_| ()).map_err(TabError::from));
    }

    /// A failed save is reported to the shell but never interrupts browsing.
    fn report_storage(&self, result: Result<()>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist browsing state");
            self.notify(ShellNotice::StorageWarning(e.to_string()));
        }
    }

    fn notify(&self, notice: ShellNotice) {
        if self.notices.send(notice).is_err() {
            tracing::trace!("Shell notification receiver dropped");
        }
    }
}
