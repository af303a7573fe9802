// crates/core/src/lib.rs
pub mod classify;
pub mod command_merge;
pub mod config;
pub mod dedup;
pub mod error;
pub mod flatten;
pub mod grouping;
pub mod index;
pub mod pipeline;
pub mod search;
pub mod timestamp;
pub mod traverse;
pub mod tree;

pub use config::*;
pub use error::*;
pub use pipeline::*;
pub use search::*;
pub use traverse::CycleEdge;

pub use transcript_view_types as types;
