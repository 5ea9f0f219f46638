//! Doable Core Library
//!
//! This is the core library for the doable task runner. It provides the task
//! registry used to bootstrap a conda toolchain and to lint, test and document
//! a Python project, together with the small engine that runs it.
//!
//! ## Architecture
//!
//! - [`workspace_manager`] - High-level interface used by the CLI
//! - [`registry`] - Named task descriptors in registration order
//! - [`tasks`] - The built-in task definitions
//! - [`task`] - Task descriptor data model
//! - [`params`] - Task parameters, argument parsing and `%(name)s` substitution
//! - [`platform`] - Operating system detection and installer URLs
//! - [`task_execution`] - Execution planning and up-to-date checks
//! - [`execution`] - Dependency ordering, command execution, downloads and the runner
//! - [`state`] - Persisted file-dependency digests
//! - [`configs`] - `doable.yml` parsing
//! - [`results`] - Result types for workspace operations
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! ```rust,no_run
//! use doable_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
//! use std::path::PathBuf;
//!
//! # fn example() -> doable_core::types::DoableResult<()> {
//! let manager = WorkspaceManager::new(WorkspaceManagerConfig {
//!     workspace_root: PathBuf::from("."),
//!     config_path: None,
//!     platform: None,
//! })?;
//!
//! for task in manager.list_tasks().tasks {
//!     println!("{}", task.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod execution;
pub mod params;
pub mod platform;
pub mod registry;
pub mod results;
pub mod state;
pub mod task;
pub mod task_execution;
pub mod tasks;
pub mod types;
pub mod workspace_manager;

// Re-export the main types for easier usage
pub use registry::TaskRegistry;
pub use task::{Action, TaskDescriptor};
pub use types::{DoableError, DoableResult};
pub use workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
