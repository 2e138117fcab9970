//! In-memory virtual file system for the BitOS terminal.
//!
//! The tree is an explicit [`Node`] enum rooted at `/`. Working-directory
//! state is not stored here: every operation takes a [`CurrentDir`] owned by
//! the caller's session.

pub mod node;
pub mod path;
pub mod seed;
pub mod tree;

pub use node::{Directory, Entry, EntryKind, Node};
pub use tree::{CurrentDir, RemoveOptions, VirtualFileSystem};
