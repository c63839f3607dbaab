//! Main browser state container
//!
//! Everything the window shell talks to is reached through [`Browser`]. It is
//! built once from an explicit [`Config`] and owns the tab strip, the zoom
//! state, address-bar resolution and the keymap.

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use veil_history::{FaviconCache, HistoryLedger};
use veil_storage::{DocumentStore, JsonFileStore};
use veil_tabs::{EngineEvent, EngineFactory, ShellNotice, TabId, TabManager};

use crate::config::Config;
use crate::input::{InputResolution, InputResolver};
use crate::keymap::{Action, Keymap};
use crate::zoom::{ZoomStepper, DEFAULT_ZOOM_STEPS};
use crate::Result;

/// Effects only the window shell can carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellRequest {
    FocusAddressBar,
    /// Show or hide the developer tools attached to this tab's engine
    ToggleDevTools(TabId),
}

pub struct Browser {
    config: Config,
    tabs: TabManager,
    zoom: ZoomStepper,
    resolver: InputResolver,
    keymap: Keymap,
}

impl Browser {
    /// Build the browser over a document store and open the first tab.
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        engines: Box<dyn EngineFactory>,
    ) -> Result<(Self, UnboundedReceiver<ShellNotice>)> {
        config.validate()?;

        let history = HistoryLedger::new(store.clone());
        let favicons = FaviconCache::new(store);
        let (tabs, notices) = TabManager::new(config.tab_settings(), history, favicons, engines);

        let zoom = ZoomStepper::new(DEFAULT_ZOOM_STEPS, Some(config.zoom_level));
        let resolver = InputResolver::new(config.search_engine.clone(), config.homepage.clone());

        let mut browser = Self {
            config,
            tabs,
            zoom,
            resolver,
            keymap: Keymap::default(),
        };
        browser.new_tab(None);

        tracing::info!(
            version = %browser.config.local_version,
            zoom = browser.zoom.current(),
            "Browser initialized"
        );

        Ok((browser, notices))
    }

    /// Open the browser with history and favicons as JSON files in `config.data_dir`.
    pub fn open(
        config: Config,
        engines: Box<dyn EngineFactory>,
    ) -> Result<(Self, UnboundedReceiver<ShellNotice>)> {
        let store = Arc::new(JsonFileStore::new(&config.data_dir));
        Self::new(config, store, engines)
    }

    // === Accessors ===

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn tabs_mut(&mut self) -> &mut TabManager {
        &mut self.tabs
    }

    pub fn history(&self) -> &HistoryLedger {
        self.tabs.history()
    }

    pub fn favicons(&self) -> &FaviconCache {
        self.tabs.favicons()
    }

    pub fn zoom_level(&self) -> u32 {
        self.zoom.current()
    }

    pub fn resolver(&self) -> &InputResolver {
        &self.resolver
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn set_keymap(&mut self, keymap: Keymap) {
        self.keymap = keymap;
    }

    // === Actions ===

    /// Open a tab at the current zoom level.
    pub fn new_tab(&mut self, url: Option<&str>) -> TabId {
        let id = self.tabs.create_tab(url);
        self.tabs.set_zoom(self.zoom.current());
        id
    }

    /// Run the action bound to a key chord, if any.
    pub fn press(&mut self, keys: &str) -> Option<ShellRequest> {
        match self.keymap.action_for(keys) {
            Some(action) => self.dispatch(action),
            None => {
                tracing::trace!(keys = %keys, "Unbound key");
                None
            }
        }
    }

    pub fn dispatch(&mut self, action: Action) -> Option<ShellRequest> {
        tracing::debug!(action = ?action, "Dispatching action");

        match action {
            Action::NewTab => {
                self.new_tab(None);
            }
            Action::CloseTab => {
                if let Some(index) = self.tabs.active_index() {
                    self.tabs.close_tab_at(index);
                }
            }
            Action::NextTab => self.tabs.next_tab(),
            Action::PreviousTab => self.tabs.previous_tab(),
            Action::Reload => self.tabs.reload(),
            Action::Back => self.tabs.go_back(),
            Action::Forward => self.tabs.go_forward(),
            Action::Home => self.navigate_home(),
            Action::ZoomIn => {
                self.zoom_in();
            }
            Action::ZoomOut => {
                self.zoom_out();
            }
            Action::ZoomReset => {
                self.zoom_reset();
            }
            Action::FocusAddressBar => return Some(ShellRequest::FocusAddressBar),
            Action::ToggleDevTools => {
                return self.tabs.active_tab_id().map(ShellRequest::ToggleDevTools);
            }
        }

        None
    }

    /// Load whatever was typed into the address bar.
    ///
    /// With no tab open, a new one is created for it.
    pub fn submit_address(&mut self, text: &str) -> InputResolution {
        let resolution = self.resolver.resolve(text);
        tracing::info!(resolution = ?resolution, "Address submitted");

        if self.tabs.active_tab().is_some() {
            self.tabs.navigate_active(resolution.url());
        } else {
            self.new_tab(Some(resolution.url()));
        }

        resolution
    }

    pub fn navigate_home(&mut self) {
        let homepage = self.config.homepage.clone();
        self.tabs.navigate_active(&homepage);
    }

    pub fn zoom_in(&mut self) -> u32 {
        let level = self.zoom.up();
        self.tabs.set_zoom(level);
        level
    }

    pub fn zoom_out(&mut self) -> u32 {
        let level = self.zoom.down();
        self.tabs.set_zoom(level);
        level
    }

    pub fn zoom_reset(&mut self) -> u32 {
        let level = self.zoom.reset();
        self.tabs.set_zoom(level);
        level
    }

    /// Forward an engine event to the tab manager.
    pub fn handle_event(&mut self, id: &TabId, event: EngineEvent) {
        self.tabs.handle_event(id, event);
    }
}
