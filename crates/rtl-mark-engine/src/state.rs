//! Enable/disable state model.
//!
//! Two inputs decide whether the engine works: a persisted global flag
//! shared by every tab, and a per-tab override that lives only as long as
//! the tab's session. The override wins whenever it is set; `None` means
//! "inherit the global". The font preference rides alongside but never
//! influences activity.

use serde::{Deserialize, Serialize};

/// Persisted, tab-independent settings. Both flags default to on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub global_enabled: bool,
    pub use_alt_font: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            global_enabled: true,
            use_alt_font: true,
        }
    }
}

/// One field of [`GlobalSettings`] changing, as echoed by the settings
/// store's change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingChange {
    GlobalEnabled(bool),
    UseAltFont(bool),
}

/// The resolved state every component consults before acting. Derived on
/// demand from the resolver's inputs, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveState {
    pub is_active: bool,
    pub use_alt_font: bool,
}

/// Combines the global settings with the per-tab override.
#[derive(Debug, Clone, Default)]
pub struct StateResolver {
    settings: GlobalSettings,
    tab_override: Option<bool>,
}

impl StateResolver {
    pub fn new(settings: GlobalSettings, tab_override: Option<bool>) -> Self {
        Self {
            settings,
            tab_override,
        }
    }

    pub fn effective_state(&self) -> EffectiveState {
        EffectiveState {
            is_active: self.tab_override.unwrap_or(self.settings.global_enabled),
            use_alt_font: self.settings.use_alt_font,
        }
    }

    pub fn settings(&self) -> GlobalSettings {
        self.settings
    }

    pub fn tab_override(&self) -> Option<bool> {
        self.tab_override
    }

    pub fn set_settings(&mut self, settings: GlobalSettings) {
        self.settings = settings;
    }

    pub fn apply_change(&mut self, change: SettingChange) {
        match change {
            SettingChange::GlobalEnabled(value) => self.settings.global_enabled = value,
            SettingChange::UseAltFont(value) => self.settings.use_alt_font = value,
        }
    }

    pub fn set_tab_override(&mut self, value: Option<bool>) {
        self.tab_override = value;
    }
}
