// crates/types/src/lib.rs
//! Shared data model for the transcript flattening engine: input records,
//! decoded tool results, group payloads and the flattened render sequence.
pub mod flattened;
pub mod groups;
pub mod message;
pub mod result;

pub use flattened::*;
pub use groups::*;
pub use message::*;
pub use result::*;
