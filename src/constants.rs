//! Shared constants used across the application.

/// User agent string sent with every outbound request.
pub const USER_AGENT: &str = concat!("fandom-activity-notifier/", env!("CARGO_PKG_VERSION"));

/// Base URL of the Fandom services host (discussion posts API).
pub const SERVICES_HOST: &str = "https://services.fandom.com";
