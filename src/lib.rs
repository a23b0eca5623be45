//! snapkeep: rsync backup scheduling and archive retention.
//!
//! The agent mirrors a source into a destination via the system `rsync`
//! binary, archives displaced files into dated snapshot directories, and
//! trims the accumulated archive down to a retention count. Trimming is the
//! dangerous part: it deletes whole subtrees and then prunes the emptied
//! parent directories, so every destructive step is bounded by the archive
//! root and reported in an explicit [`orchestrator::TrimReport`].

pub mod config;
pub mod errors;
pub mod orchestrator;
pub mod sys;

pub use config::{AgentConfig, OnError};
pub use errors::BackupError;
pub use orchestrator::{BackupOrchestrator, TrimReport};
