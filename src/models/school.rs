use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct School {
    pub id: String,
    /// Identifier carried by sessions and magic links; distinct from the
    /// row id so links survive a re-import of the school table.
    pub external_id: String,
    pub name: String,
}
