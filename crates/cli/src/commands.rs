pub mod clean;
pub mod forget;
pub mod graph;
pub mod info;
pub mod list;
pub mod plan;
pub mod run;
pub mod schema;
