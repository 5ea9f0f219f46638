//! Task execution module
//!
//! This module handles the actual execution of tasks including command execution,
//! downloads, dependency ordering, and result reporting.

pub mod command;
pub mod dependencies;
pub mod download;
pub mod runner;

pub use command::CommandExecutor;
pub use dependencies::resolve_execution_order;
pub use download::Downloader;
pub use runner::{TaskRunner, TaskRunnerConfig};
