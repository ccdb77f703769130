//! Wiki pages and page revisions.

/// A page referenced by a recent change or log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub id: u64,
    pub name: String,
    pub namespace: i64,
}

/// A page known only by title, as discussion payloads reference article
/// comment targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialPage {
    pub name: String,
}

/// One revision of a page, identified by revision id and byte size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageVersion {
    pub id: u64,
    pub size: i64,
}
