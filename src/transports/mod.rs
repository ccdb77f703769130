//! Delivery transports.
//!
//! A transport receives normalized entries one at a time. The dispatcher
//! isolates each delivery, so a failing or panicking transport never affects
//! its siblings, but implementations should still return errors rather than
//! panic.

pub mod discord;

use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;

use crate::entry::Entry;

/// A delivery backend registered on a wiki.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &'static str;

    /// Delivers one normalized entry.
    ///
    /// # Errors
    ///
    /// Returns an error when delivery fails; the dispatcher logs it and
    /// moves on.
    async fn deliver(&self, entry: &Entry) -> Result<()>;
}

/// Known transport kinds. Parsed from configuration; an unrecognized kind is
/// rejected at load time, never at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Discord,
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discord" => Ok(Self::Discord),
            other => Err(other.to_string()),
        }
    }
}

/// Constructs a transport of the given kind.
#[must_use]
pub fn build(
    kind: TransportKind,
    webhook_url: String,
    http: reqwest::Client,
) -> Box<dyn Transport> {
    match kind {
        TransportKind::Discord => Box::new(discord::DiscordTransport::new(http, webhook_url)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_kind_parse() {
        assert_eq!("discord".parse::<TransportKind>(), Ok(TransportKind::Discord));
        assert_eq!("telegram".parse::<TransportKind>(), Err("telegram".to_string()));
        // Case-sensitive, like the rest of the config surface.
        assert!("Discord".parse::<TransportKind>().is_err());
    }
}
