//! Wiki user accounts as they appear in API payloads.

/// A user account referenced by an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: u64,
    pub name: String,
}
