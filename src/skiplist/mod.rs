//! Probabilistic linked hierarchy of subsequences.

mod entry;
mod head;
mod index;
mod trace;

pub use self::entry::Entry;
pub use self::index::{EntryRef, Index, IndexConfig, Iter};
pub use self::trace::{SearchPath, SearchStep};
