//! Domain model layer for driftsync
//!
//! Owns the authoritative, server-pushed state:
//! - [`ModelFile`]: immutable snapshot of one tracked file or directory
//! - [`ModelFileStore`]: the name → snapshot map, kept in sync by stream events
//! - [`CommandClient`]: REST actions (queue/stop/extract/delete) as [`Reaction`]s
//! - [`ServerStatusStore`]: server/controller health pushed on the same stream

pub mod command;
pub mod error;
pub mod file;
pub mod status;
pub mod store;

pub use command::{CommandBackend, CommandClient, FileCommand, Reaction};
pub use error::ModelError;
pub use file::{FileState, ModelFile, ModelFileJson};
pub use status::{ControllerStatus, ServerInfo, ServerStatus, ServerStatusStore};
pub use store::{FileMap, ModelFileStore};
