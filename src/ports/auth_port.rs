//! Authentication port trait.

use crate::domain::error::JournalError;

/// A resolved account: every journal row belongs to exactly one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: i64,
    pub username: String,
}

pub trait AuthPort {
    /// Resolve a presented bearer token to its owner, or `None` when no
    /// account matches.
    fn resolve_token(&self, token: &str) -> Result<Option<Owner>, JournalError>;
}
