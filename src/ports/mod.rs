//! Port traits for external collaborators.

pub mod auth_port;
pub mod config_port;
pub mod image_port;
pub mod journal_port;
pub mod pairs_port;
