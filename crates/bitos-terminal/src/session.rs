//! Per-terminal state: file tree, working directory, and history.

use bitos_vfs::{CurrentDir, VirtualFileSystem};

use crate::store::SavedSession;

/// One terminal's isolated state.
#[derive(Debug, Clone)]
pub struct Session {
    vfs: VirtualFileSystem,
    cwd: CurrentDir,
    history: Vec<String>,
    history_limit: usize,
}

impl Session {
    /// Fresh session on the seeded tree, starting in the home directory.
    pub fn new(history_limit: usize) -> Self {
        Self::with_vfs(VirtualFileSystem::seeded(), history_limit)
    }

    pub fn with_vfs(vfs: VirtualFileSystem, history_limit: usize) -> Self {
        Self {
            vfs,
            cwd: CurrentDir::home(),
            history: Vec::new(),
            history_limit: history_limit.max(1),
        }
    }

    pub fn vfs(&self) -> &VirtualFileSystem {
        &self.vfs
    }

    pub fn cwd(&self) -> &CurrentDir {
        &self.cwd
    }

    /// Entered lines, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Record an entered line. Blank lines and repeats of the previous
    /// entry are skipped; the oldest entry is dropped past the limit.
    pub fn push_history(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if self.history.last().is_none_or(|last| last != line) {
            self.history.push(line.to_string());
            if self.history.len() > self.history_limit {
                let excess = self.history.len() - self.history_limit;
                self.history.drain(..excess);
            }
        }
    }

    /// Borrow the pieces a command needs at once.
    pub(crate) fn parts(&mut self) -> (&mut CurrentDir, &mut VirtualFileSystem, &[String]) {
        (&mut self.cwd, &mut self.vfs, &self.history)
    }

    /// Persistable view of this session.
    pub fn snapshot(&self) -> SavedSession {
        SavedSession {
            cwd: self.cwd.as_str().to_string(),
            history: self.history.clone(),
        }
    }

    /// Apply a saved working directory and history. A directory that no
    /// longer exists falls back to home.
    pub fn restore(&mut self, saved: SavedSession) {
        self.cwd = self.vfs.restore_directory(&saved.cwd);
        self.history = saved.history;
        if self.history.len() > self.history_limit {
            let excess = self.history.len() - self.history_limit;
            self.history.drain(..excess);
        }
    }
}
