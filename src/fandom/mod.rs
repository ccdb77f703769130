//! Fandom platform model and API access.

pub mod account;
pub mod discussions;
pub mod endpoint;
pub mod page;
pub mod recent;
pub mod urls;
pub mod wiki;
