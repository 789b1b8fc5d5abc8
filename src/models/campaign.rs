use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// One row per student per school. `description` holds the serialized
/// campaign ledger and is opaque outside the ledger codec.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeeLedgerRow {
    pub id: String,
    pub student_id: String,
    pub school_id: String,
    pub description: String,
}

/// A single entry in a student's fee ledger: a campaign title plus a
/// charge-name -> amount map.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CampaignEntry {
    pub title: String,
    pub desc: BTreeMap<String, f64>,
}

impl CampaignEntry {
    pub fn new(title: impl Into<String>, desc: BTreeMap<String, f64>) -> Self {
        CampaignEntry {
            title: title.into(),
            desc,
        }
    }

    /// Lenient read of a decoded ledger element. Entries with a missing or
    /// empty title, or a non-object `desc`, are corrupt and yield `None`;
    /// non-numeric charge values inside a valid `desc` are dropped.
    pub fn from_value(value: &Value) -> Option<CampaignEntry> {
        let title = value.get("title")?.as_str()?;
        if title.is_empty() {
            return None;
        }
        let desc = value.get("desc")?.as_object()?;
        let charges = desc
            .iter()
            .filter_map(|(name, amount)| amount.as_f64().map(|a| (name.clone(), a)))
            .collect();
        Some(CampaignEntry {
            title: title.to_string(),
            desc: charges,
        })
    }

    pub fn to_value(&self) -> Value {
        json!({ "title": self.title, "desc": self.desc })
    }

    pub fn total(&self) -> f64 {
        self.desc.values().sum()
    }
}

/// Derived projection over every fee ledger of a school; recomputed on
/// each read, never persisted. `student_ids` is the defaulter list and may
/// contain duplicates when one ledger repeats a title.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Campaign {
    pub title: String,
    pub desc: BTreeMap<String, f64>,
    pub student_ids: Vec<String>,
}
