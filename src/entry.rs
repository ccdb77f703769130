//! Normalized event model.
//!
//! Every raw payload — recent change, log event, discussion post — is
//! converted into an [`Entry`] before dispatch, so transports only ever see
//! one shape.

use chrono::{DateTime, Utc};

use crate::fandom::account::Account;
use crate::fandom::page::{Page, PageVersion};

/// Broad category of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Edit,
    Log,
    Post,
}

/// Concrete action the entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreatePage,
    EditPage,
    RenamePage,
    DeletePage,
    UndeletePage,
    CreatePost,
    ReplyPost,
}

impl Action {
    /// Short human-readable label, used by transports when rendering.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::CreatePage => "created page",
            Self::EditPage => "edited page",
            Self::RenamePage => "renamed page",
            Self::DeletePage => "deleted page",
            Self::UndeletePage => "restored page",
            Self::CreatePost => "started discussion",
            Self::ReplyPost => "replied to discussion",
        }
    }
}

/// What the action was performed on.
#[derive(Debug, Clone)]
pub enum Target {
    Page(Page),
    Thread {
        id: String,
        title: Option<String>,
    },
}

impl Target {
    /// Display title for the target, if it has one.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Page(page) => Some(&page.name),
            Self::Thread { title, .. } => title.as_deref(),
        }
    }
}

/// Old/new revision pair for an edit.
#[derive(Debug, Clone, Copy)]
pub struct Diff {
    pub old: PageVersion,
    pub new: PageVersion,
}

impl Diff {
    /// Signed byte delta between the revisions.
    #[must_use]
    pub fn size_delta(&self) -> i64 {
        self.new.size - self.old.size
    }
}

/// Parameters recorded for a page rename.
#[derive(Debug, Clone)]
pub struct RenameParams {
    pub target_title: String,
    pub target_namespace: i64,
    pub suppress_redirect: bool,
}

/// Action-specific payload.
#[derive(Debug, Clone)]
pub enum Details {
    Diff(Diff),
    Rename(RenameParams),
}

/// One normalized event, ready for transport delivery.
#[derive(Debug, Clone)]
pub struct Entry {
    pub kind: EntryKind,
    pub action: Action,
    pub target: Target,
    pub user: Option<Account>,
    pub summary: Option<String>,
    pub details: Option<Details>,
    /// Canonical URL of the target, derived at normalization time.
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_size_delta() {
        let diff = Diff {
            old: PageVersion { id: 1, size: 100 },
            new: PageVersion { id: 2, size: 160 },
        };
        assert_eq!(diff.size_delta(), 60);

        let shrink = Diff {
            old: PageVersion { id: 3, size: 200 },
            new: PageVersion { id: 4, size: 50 },
        };
        assert_eq!(shrink.size_delta(), -150);
    }

    #[test]
    fn test_action_labels_are_distinct() {
        let labels = [
            Action::CreatePage.label(),
            Action::EditPage.label(),
            Action::RenamePage.label(),
            Action::DeletePage.label(),
            Action::UndeletePage.label(),
            Action::CreatePost.label(),
            Action::ReplyPost.label(),
        ];
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
