use serde::{Deserialize, Serialize};

/// Capability-bearing link record: possession of `id` plus the matching
/// `magic_pass` grants attendance read/write for one class-section, with
/// no account and no expiry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MagicLink {
    pub id: String,
    pub magic_pass: String,
    /// External school identifier, resolved to a school row on login.
    pub school_id: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub section: String,
}

/// Value handed out by a successful magic-link login and passed into every
/// attendance operation it authorizes. Held only by the caller; nothing is
/// persisted server-side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MagicSession {
    pub link_id: String,
    pub school_id: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub section: String,
}
