//! Inbound request protocol.
//!
//! Requests arrive over a generic message channel as tagged JSON; the wire
//! tags and camelCase field names are shared with the settings UI and are
//! part of the public surface. The union is closed: the engine matches it
//! exhaustively, and an unknown tag fails deserialization at the boundary
//! instead of reaching dispatch.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Report the tab's resolved state plus its inputs.
    #[serde(rename = "GET_STATUS")]
    GetStatus,
    /// Set (or with `value: null` clear) this tab's override.
    #[serde(rename = "SET_LOCAL_STATE")]
    SetLocalState { value: Option<bool> },
}

/// Payload answering [`Request::GetStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub global_enabled: bool,
    pub tab_override: Option<bool>,
    pub is_active: bool,
    pub use_alt_font: bool,
}

/// Payload answering [`Request::SetLocalState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Status(StatusReport),
    Ack(Ack),
}
