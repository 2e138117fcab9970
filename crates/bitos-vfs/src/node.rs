//! Tree nodes: directories and files.

use std::collections::BTreeMap;

/// A node in the virtual file tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A directory with uniquely named children.
    Directory(Directory),
    /// A regular file holding text content.
    File(String),
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A single entry returned by a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    /// Content length in bytes (0 for directories).
    pub size: u64,
}

impl Node {
    /// Kind of this node.
    pub fn kind(&self) -> EntryKind {
        match self {
            Node::Directory(_) => EntryKind::Directory,
            Node::File(_) => EntryKind::File,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    /// Content length for files, 0 for directories.
    pub fn size(&self) -> u64 {
        match self {
            Node::File(content) => content.len() as u64,
            Node::Directory(_) => 0,
        }
    }

    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Node::Directory(dir) => Some(dir),
            Node::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&str> {
        match self {
            Node::File(content) => Some(content),
            Node::Directory(_) => None,
        }
    }
}

/// Children of a directory, kept in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    entries: BTreeMap<String, Node>,
}

impl Directory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a file child.
    pub fn file(mut self, name: &str, content: &str) -> Self {
        self.insert(name, Node::File(content.to_string()));
        self
    }

    /// Builder: add a subdirectory child.
    pub fn dir(mut self, name: &str, child: Directory) -> Self {
        self.insert(name, Node::Directory(child));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Insert or replace a child, returning the previous node.
    pub fn insert(&mut self, name: impl Into<String>, node: Node) -> Option<Node> {
        self.entries.insert(name.into(), node)
    }

    pub fn remove(&mut self, name: &str) -> Option<Node> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Children in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Listing entries in name order.
    pub fn entries(&self) -> Vec<Entry> {
        self.iter()
            .map(|(name, node)| Entry {
                name: name.to_string(),
                kind: node.kind(),
                size: node.size(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_inserts_children() {
        let dir = Directory::new()
            .file("b.txt", "bee")
            .dir("a", Directory::new());
        assert_eq!(dir.len(), 2);
        assert!(dir.get("a").is_some_and(Node::is_dir));
        assert_eq!(dir.get("b.txt").and_then(Node::as_file), Some("bee"));
    }

    #[test]
    fn entries_are_name_ordered() {
        let dir = Directory::new()
            .file("zeta", "")
            .file("alpha", "12345")
            .dir("mid", Directory::new());
        let names: Vec<String> = dir.entries().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
        assert_eq!(dir.entries()[0].size, 5);
        assert_eq!(dir.entries()[1].kind, EntryKind::Directory);
    }

    #[test]
    fn insert_replaces_and_returns_previous() {
        let mut dir = Directory::new().file("x", "old");
        let prev = dir.insert("x", Node::File("new".into()));
        assert_eq!(prev, Some(Node::File("old".into())));
        assert_eq!(dir.get("x").and_then(Node::as_file), Some("new"));
    }

    #[test]
    fn node_accessors() {
        let file = Node::File("abc".into());
        assert_eq!(file.kind(), EntryKind::File);
        assert_eq!(file.size(), 3);
        assert!(file.as_directory().is_none());

        let dir = Node::Directory(Directory::new());
        assert_eq!(dir.size(), 0);
        assert!(dir.as_file().is_none());
        assert!(dir.as_directory().is_some_and(Directory::is_empty));
    }
}
