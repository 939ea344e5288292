//! Hailstone - resumable Collatz counterexample search
//!
//! A single-threaded diagnostic daemon that walks odd integers upward from
//! a large fixed origin, evaluates each candidate's bounded-descent
//! hailstone trajectory, and checkpoints its position to disk so the
//! search survives restarts.
//!
//! # Core Concepts
//!
//! - **Bounded descent**: a candidate is cleared as soon as its trajectory
//!   drops below the candidate itself (every smaller value was already
//!   searched)
//! - **Best-effort checkpoints**: persistence failures are logged, never
//!   fatal; the search favors availability over durability
//! - **Resume chain**: primary save, then backup save, then the configured
//!   initial constant
//!
//! # Modules
//!
//! - [`trajectory`] - per-candidate descent evaluation
//! - [`checkpoint`] - seed persistence and the resume chain
//! - [`lock`] - scoped exclusive file access
//! - [`search`] - the main loop and timeout guard
//! - [`config`] - configuration types and loading
//! - [`daemon`] - background process management
//! - [`cli`] - command-line interface

pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod lock;
pub mod search;
pub mod trajectory;

// Re-export commonly used types
pub use checkpoint::{CheckpointError, CheckpointStore};
pub use config::{Config, DEFAULT_INITIAL_SEED, FilesConfig, SearchConfig};
pub use daemon::{DaemonManager, DaemonStatus};
pub use lock::LockedFile;
pub use search::{SearchEngine, StopReason, TimeoutGuard};
pub use trajectory::{Descent, descend};
