pub mod detect;
pub mod dom;
pub mod engine;
pub mod host;
pub mod marker;
pub mod protocol;
pub mod resolve;
pub mod scan;
pub mod state;
pub mod watch;

// Re-export key types for easier usage
pub use detect::is_rtl_script;
pub use dom::{
    Classification, DomError, DomTree, ElementData, MutationRecord, NodeData, NodeId,
    ObserveOptions, classify, parse_html,
};
pub use engine::Engine;
pub use host::{ChannelClosed, KeyValueStore, MemoryStore, Responder, SharedStore, shared};
pub use marker::{ALT_FONT_CLASS, RTL_MARKER_CLASS};
pub use protocol::{Ack, Request, Response, StatusReport};
pub use resolve::find_taggable_ancestor;
pub use state::{EffectiveState, GlobalSettings, SettingChange, StateResolver};
pub use watch::ChangeWatcher;
