//! The mutable directory tree and its operations.
//!
//! Lookups resolve full paths relative to a [`CurrentDir`]. Mutations act on
//! the current directory's children only and take single entry names.
//! Every failed operation leaves the tree untouched.

use std::fmt;

use bitos_types::error::{BitosError, Result};

use crate::node::{Directory, Entry, EntryKind, Node};
use crate::path::{self, HOME};
use crate::seed;

/// Normalized absolute working directory of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentDir(String);

impl CurrentDir {
    /// The user's home directory.
    pub fn home() -> Self {
        Self(HOME.to_string())
    }

    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrentDir {
    fn default() -> Self {
        Self::home()
    }
}

impl fmt::Display for CurrentDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flags for [`VirtualFileSystem::remove`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveOptions {
    /// Allow removing directories and their contents.
    pub recursive: bool,
    /// Ignore missing entries.
    pub force: bool,
}

/// An in-memory directory tree rooted at `/`.
#[derive(Debug, Clone)]
pub struct VirtualFileSystem {
    root: Node,
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn check_name(name: &str) -> Result<()> {
    if path::is_valid_name(name) {
        Ok(())
    } else {
        Err(BitosError::usage(format!("{name}: Invalid argument")))
    }
}

impl VirtualFileSystem {
    /// A tree with only an empty root directory.
    pub fn new() -> Self {
        Self {
            root: Node::Directory(Directory::new()),
        }
    }

    /// A tree populated with the Debian-like snapshot.
    pub fn seeded() -> Self {
        Self {
            root: seed::debian_root(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Any node at `target`, resolved against `cwd`.
    pub fn node(&self, cwd: &CurrentDir, target: &str) -> Option<&Node> {
        let absolute = path::resolve_relative(cwd.as_str(), target);
        path::resolve_absolute(&self.root, &absolute)
    }

    /// The directory `cwd` points at, if it still exists.
    pub fn current_directory(&self, cwd: &CurrentDir) -> Option<&Directory> {
        path::resolve_absolute(&self.root, cwd.as_str()).and_then(Node::as_directory)
    }

    /// Change `cwd` to `target`. `cwd` is only updated on success.
    pub fn change_directory(&self, cwd: &mut CurrentDir, target: &str) -> Result<()> {
        let absolute = path::resolve_relative(cwd.as_str(), target);
        match path::resolve_absolute(&self.root, &absolute) {
            Some(Node::Directory(_)) => {
                log::trace!("cd {} -> {absolute}", cwd.as_str());
                cwd.0 = absolute;
                Ok(())
            },
            Some(Node::File(_)) => Err(BitosError::not_a_directory(target)),
            None => Err(BitosError::NotFound(target.to_string())),
        }
    }

    /// Restore a saved working directory, falling back to home when the
    /// saved path no longer names a directory.
    pub fn restore_directory(&self, saved: &str) -> CurrentDir {
        let absolute = path::join(&path::normalize(saved));
        match path::resolve_absolute(&self.root, &absolute) {
            Some(Node::Directory(_)) => CurrentDir(absolute),
            _ => {
                log::warn!("saved directory {saved} is gone, using {HOME}");
                CurrentDir::home()
            },
        }
    }

    pub fn directory(&self, cwd: &CurrentDir, target: &str) -> Option<&Directory> {
        self.node(cwd, target).and_then(Node::as_directory)
    }

    pub fn file_content(&self, cwd: &CurrentDir, target: &str) -> Option<&str> {
        self.node(cwd, target).and_then(Node::as_file)
    }

    /// Children of `target` (or of `cwd` when `None`), in name order.
    pub fn list_entries(&self, cwd: &CurrentDir, target: Option<&str>) -> Result<Vec<Entry>> {
        let shown = target.unwrap_or(cwd.as_str());
        match self.node(cwd, shown) {
            Some(Node::Directory(dir)) => Ok(dir.entries()),
            Some(Node::File(_)) => Err(BitosError::not_a_directory(shown)),
            None => Err(BitosError::NotFound(shown.to_string())),
        }
    }

    fn current_mut(&mut self, cwd: &CurrentDir) -> Result<&mut Directory> {
        let mut current = &mut self.root;
        for segment in path::normalize(cwd.as_str()) {
            current = match current {
                Node::Directory(dir) => dir
                    .get_mut(&segment)
                    .ok_or_else(|| BitosError::NotFound(cwd.to_string()))?,
                Node::File(_) => return Err(BitosError::not_a_directory(cwd.to_string())),
            };
        }
        match current {
            Node::Directory(dir) => Ok(dir),
            Node::File(_) => Err(BitosError::not_a_directory(cwd.to_string())),
        }
    }

    /// Create an empty directory `name` in `cwd`.
    pub fn make_directory(&mut self, cwd: &CurrentDir, name: &str) -> Result<()> {
        check_name(name)?;
        let dir = self.current_mut(cwd)?;
        if dir.contains(name) {
            return Err(BitosError::AlreadyExists(name.to_string()));
        }
        dir.insert(name, Node::Directory(Directory::new()));
        Ok(())
    }

    /// Create `name` in `cwd`, replacing an existing file's content.
    pub fn create_or_overwrite_file(
        &mut self,
        cwd: &CurrentDir,
        name: &str,
        content: &str,
    ) -> Result<()> {
        check_name(name)?;
        let dir = self.current_mut(cwd)?;
        if dir.get(name).is_some_and(Node::is_dir) {
            return Err(BitosError::is_a_directory(name));
        }
        dir.insert(name, Node::File(content.to_string()));
        Ok(())
    }

    /// Remove `name` from `cwd`.
    pub fn remove(&mut self, cwd: &CurrentDir, name: &str, options: RemoveOptions) -> Result<()> {
        check_name(name)?;
        let dir = self.current_mut(cwd)?;
        match dir.get(name).map(Node::kind) {
            None if options.force => Ok(()),
            None => Err(BitosError::NotFound(name.to_string())),
            Some(EntryKind::Directory) if !options.recursive => {
                Err(BitosError::is_a_directory(name))
            },
            Some(_) => {
                dir.remove(name);
                Ok(())
            },
        }
    }

    /// Copy file `src` to `dst` within `cwd`. The copy owns its content.
    pub fn copy(&mut self, cwd: &CurrentDir, src: &str, dst: &str) -> Result<()> {
        check_name(src)?;
        check_name(dst)?;
        let dir = self.current_mut(cwd)?;
        let content = match dir.get(src) {
            None => return Err(BitosError::NotFound(src.to_string())),
            Some(Node::Directory(_)) => return Err(BitosError::is_a_directory(src)),
            Some(Node::File(content)) => content.clone(),
        };
        if dir.get(dst).is_some_and(Node::is_dir) {
            return Err(BitosError::is_a_directory(dst));
        }
        dir.insert(dst, Node::File(content));
        Ok(())
    }

    /// Rename `src` to `dst` within `cwd`, replacing an existing file.
    pub fn move_entry(&mut self, cwd: &CurrentDir, src: &str, dst: &str) -> Result<()> {
        check_name(src)?;
        check_name(dst)?;
        let dir = self.current_mut(cwd)?;
        if !dir.contains(src) {
            return Err(BitosError::NotFound(src.to_string()));
        }
        if dir.get(dst).is_some_and(Node::is_dir) {
            return Err(BitosError::is_a_directory(dst));
        }
        if src == dst {
            return Ok(());
        }
        if let Some(node) = dir.remove(src) {
            dir.insert(dst, node);
        }
        Ok(())
    }

    /// Depth-first listing of every path below `target`, paired with its
    /// kind. A file target yields nothing.
    pub fn walk(&self, cwd: &CurrentDir, target: &str) -> Result<Vec<(String, EntryKind)>> {
        let absolute = path::resolve_relative(cwd.as_str(), target);
        let node = path::resolve_absolute(&self.root, &absolute)
            .ok_or_else(|| BitosError::NotFound(target.to_string()))?;
        let mut out = Vec::new();
        if let Node::Directory(dir) = node {
            walk_into(dir, &absolute, &mut out);
        }
        Ok(out)
    }
}

fn walk_into(dir: &Directory, prefix: &str, out: &mut Vec<(String, EntryKind)>) {
    for (name, node) in dir.iter() {
        let child = if prefix == "/" {
            format!("/{name}")
        } else {
            format!("{prefix}/{name}")
        };
        out.push((child.clone(), node.kind()));
        if let Node::Directory(sub) = node {
            walk_into(sub, &child, out);
        }
    }
}
