//! Configuration files
//!
//! `doable.yml` at the workspace root holds runner settings and any tasks
//! declared in addition to the built-in ones.

pub mod project;
pub mod tasks;
