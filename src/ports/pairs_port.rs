//! Instrument catalog port trait.

use serde::Serialize;

use crate::domain::error::JournalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PairKind {
    Crypto,
    Forex,
    Commodity,
}

impl PairKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "crypto" => Some(PairKind::Crypto),
            "forex" => Some(PairKind::Forex),
            "commodity" => Some(PairKind::Commodity),
            _ => None,
        }
    }
}

/// A filtered view of the catalog. `kind` is the detected kind of the
/// first listed pair, `None` when the list is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairList {
    #[serde(rename = "type")]
    pub kind: Option<PairKind>,
    pub pairs: Vec<String>,
}

pub trait PairsPort {
    fn list_pairs(
        &self,
        kind: Option<PairKind>,
        search: Option<&str>,
    ) -> Result<PairList, JournalError>;
}
