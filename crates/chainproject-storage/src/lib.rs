//! chainproject-storage — downstream consumers of the projection record stream.
//!
//! Backends:
//! - [`memory`] — in-memory index (dev/testing, no persistence)

pub mod error;
pub mod memory;
pub mod writer;

pub use error::IndexError;
pub use memory::InMemoryIndex;
pub use writer::{drain, IndexWriter};
