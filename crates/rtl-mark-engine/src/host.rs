//! Host capability boundaries.
//!
//! Storage and response delivery are the two places the engine touches the
//! host environment. Both are narrow by design: production bindings wrap
//! the real host primitives, tests and the CLI use the in-memory forms
//! below. Everything is single-threaded and cooperative, so shared handles
//! are plain `Rc<RefCell<…>>`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::protocol::Response;

/// Storage keys used by the engine. The first two live in the persisted
/// store; the override key lives in the tab-scoped session store.
pub mod keys {
    pub const GLOBAL_ENABLED: &str = "global_enabled";
    pub const USE_ALT_FONT: &str = "use_alt_font";
    pub const TAB_OVERRIDE: &str = "tab_override";
}

/// Minimal key/value storage. Absent keys are meaningful (the engine
/// substitutes documented defaults), so `get_bool` is an `Option`, and
/// clearing a tri-state value is `remove`, not a write.
pub trait KeyValueStore {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn set_bool(&mut self, key: &str, value: bool);
    fn remove(&mut self, key: &str);
}

/// A store handle shareable between page contexts (tabs) in one process.
pub type SharedStore = Rc<RefCell<dyn KeyValueStore>>;

/// Wrap a store for sharing.
pub fn shared<S: KeyValueStore + 'static>(store: S) -> SharedStore {
    Rc::new(RefCell::new(store))
}

/// In-memory store: the session (per-tab) store in production shape, and
/// the settings-store stand-in under test.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).copied()
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// The far end of the request channel went away before the response could
/// be delivered. Callers treat a missing response as "unknown state", so
/// the engine swallows this instead of propagating it.
#[derive(Debug, Error)]
#[error("request channel closed before the response could be delivered")]
pub struct ChannelClosed;

/// One-shot reply callback handed in alongside each inbound request.
pub type Responder = Box<dyn FnOnce(Response) -> Result<(), ChannelClosed>>;
