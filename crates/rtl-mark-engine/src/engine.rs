//! Engine façade: one instance per page context.
//!
//! Ties the state resolver, the change watcher, and the two stores
//! together behind the handful of entry points a host binding needs:
//! `init` once the stores are readable, `pump` on every delivered mutation
//! batch, the settings mutators, and `handle_request` for the message
//! channel. The document tree is passed into each call rather than owned:
//! the host owns the document, the engine only owns its own state.

use crate::dom::DomTree;
use crate::host::{Responder, SharedStore, keys};
use crate::marker;
use crate::protocol::{Ack, Request, Response, StatusReport};
use crate::scan::scan;
use crate::state::{EffectiveState, GlobalSettings, SettingChange, StateResolver};
use crate::watch::{ChangeWatcher, process_records};

pub struct Engine {
    resolver: StateResolver,
    watcher: ChangeWatcher,
    settings_store: SharedStore,
    session_store: SharedStore,
}

impl Engine {
    /// A new engine with default state. Nothing touches the document until
    /// [`Engine::init`].
    pub fn new(settings_store: SharedStore, session_store: SharedStore) -> Self {
        Self {
            resolver: StateResolver::default(),
            watcher: ChangeWatcher::new(),
            settings_store,
            session_store,
        }
    }

    /// Read the stores, then bring the document up to date: attach the
    /// watcher, set the font class, and run the one full-document scan.
    ///
    /// Must not be called before the initial settings read can complete;
    /// scanning with stale defaults would tag a page the user disabled.
    /// Absent keys fall back to the documented defaults. A tree without a
    /// body (host contexts with no renderable document) leaves the engine
    /// idle.
    pub fn init(&mut self, dom: &mut DomTree) {
        let defaults = GlobalSettings::default();
        let settings = {
            let store = self.settings_store.borrow();
            GlobalSettings {
                global_enabled: store
                    .get_bool(keys::GLOBAL_ENABLED)
                    .unwrap_or(defaults.global_enabled),
                use_alt_font: store
                    .get_bool(keys::USE_ALT_FONT)
                    .unwrap_or(defaults.use_alt_font),
            }
        };
        let tab_override = self.session_store.borrow().get_bool(keys::TAB_OVERRIDE);
        self.resolver = StateResolver::new(settings, tab_override);

        if dom.body().is_none() {
            tracing::debug!("no document body; engine stays idle");
            return;
        }
        self.watcher.attach(dom);
        let state = self.resolver.effective_state();
        marker::set_font_preference(dom, state.is_active && state.use_alt_font);
        if state.is_active
            && let Some(body) = dom.body()
        {
            scan(dom, body, &self.resolver);
        }
        tracing::debug!(is_active = state.is_active, "engine initialized");
    }

    /// Drain and dispatch everything the watcher has queued. Call once per
    /// host mutation-batch delivery. Inactive state drains without working.
    pub fn pump(&mut self, dom: &mut DomTree) {
        let records = self.watcher.drain(dom);
        if records.is_empty() {
            return;
        }
        tracing::trace!(count = records.len(), "processing mutation batch");
        process_records(dom, &self.resolver, records);
    }

    /// Flip the shared global flag. The write lands in the persisted store
    /// and is applied locally at once; the store's own change echo then
    /// finds nothing left to do.
    pub fn set_global_enabled(&mut self, dom: &mut DomTree, value: bool) {
        self.settings_store
            .borrow_mut()
            .set_bool(keys::GLOBAL_ENABLED, value);
        self.apply_change(dom, SettingChange::GlobalEnabled(value));
    }

    /// Flip the shared font preference. Same write-then-apply shape as
    /// [`Engine::set_global_enabled`].
    pub fn set_use_alt_font(&mut self, dom: &mut DomTree, value: bool) {
        self.settings_store
            .borrow_mut()
            .set_bool(keys::USE_ALT_FONT, value);
        self.apply_change(dom, SettingChange::UseAltFont(value));
    }

    /// A settings change arriving from outside this context (another tab's
    /// write, or the settings UI) via the store's change feed.
    pub fn on_settings_change(&mut self, dom: &mut DomTree, change: SettingChange) {
        self.apply_change(dom, change);
    }

    /// Set or clear (`None`) this tab's override. Persisted to the session
    /// store and resolved synchronously.
    pub fn set_tab_override(&mut self, dom: &mut DomTree, value: Option<bool>) {
        {
            let mut store = self.session_store.borrow_mut();
            match value {
                Some(v) => store.set_bool(keys::TAB_OVERRIDE, v),
                None => store.remove(keys::TAB_OVERRIDE),
            }
        }
        let before = self.resolver.effective_state();
        self.resolver.set_tab_override(value);
        self.refresh(dom, before);
    }

    pub fn effective_state(&self) -> EffectiveState {
        self.resolver.effective_state()
    }

    pub fn status(&self) -> StatusReport {
        let state = self.resolver.effective_state();
        StatusReport {
            global_enabled: self.resolver.settings().global_enabled,
            tab_override: self.resolver.tab_override(),
            is_active: state.is_active,
            use_alt_font: state.use_alt_font,
        }
    }

    /// Dispatch one inbound request and produce its response.
    pub fn handle_request(&mut self, dom: &mut DomTree, request: Request) -> Response {
        match request {
            Request::GetStatus => Response::Status(self.status()),
            Request::SetLocalState { value } => {
                self.set_tab_override(dom, value);
                Response::Ack(Ack { success: true })
            }
        }
    }

    /// [`Engine::handle_request`] plus reply delivery. A channel whose far
    /// end is gone is the caller's problem to interpret, not an engine
    /// error; the failure is logged and dropped.
    pub fn serve(&mut self, dom: &mut DomTree, request: Request, respond: Responder) {
        let response = self.handle_request(dom, request);
        if let Err(err) = respond(response) {
            tracing::debug!(%err, "dropping undeliverable response");
        }
    }

    fn apply_change(&mut self, dom: &mut DomTree, change: SettingChange) {
        let before = self.resolver.effective_state();
        self.resolver.apply_change(change);
        self.refresh(dom, before);
    }

    /// Re-derive the document from the new state. The font class is always
    /// recomputed; markers are only touched when activity actually flipped.
    /// A change that stays active (font flag alone) must not trigger a
    /// re-scan or a clear.
    fn refresh(&mut self, dom: &mut DomTree, before: EffectiveState) {
        let after = self.resolver.effective_state();
        marker::set_font_preference(dom, after.is_active && after.use_alt_font);
        if before.is_active == after.is_active {
            return;
        }
        if after.is_active {
            if let Some(body) = dom.body() {
                scan(dom, body, &self.resolver);
            }
            tracing::debug!("activated; document re-scanned");
        } else {
            let root = dom.root();
            marker::clear_all_markers(dom, root);
            tracing::debug!("deactivated; markers cleared");
        }
    }
}
