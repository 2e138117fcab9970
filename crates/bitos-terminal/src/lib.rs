//! Command interpreter and terminal subsystem.
//!
//! The terminal is a registry-based dispatch system. Commands implement the
//! `Command` trait and are registered by name. The interpreter tokenizes
//! input lines, resolves the command name through one alias table, and
//! dispatches `execute()` against the session's file tree.

mod commands;
pub mod file_commands;
mod interpreter;
pub mod kernel_commands;
pub mod network_commands;
pub mod package_commands;
pub mod process_commands;
pub mod services;
mod session;
mod shell;
pub mod store;
pub mod system_commands;
#[cfg(test)]
mod testing;
pub mod text_commands;
pub mod user_commands;
pub mod utility_commands;

/// Register all built-in command families into a registry.
pub use commands::register_builtins;
/// Register file system commands (ls, cd, cat, rm, ...) into a registry.
pub use file_commands::register_file_commands;
/// The clear-screen sentinel a front end must recognise.
pub use interpreter::CLEAR_SENTINEL;
/// A single executable command trait.
pub use interpreter::Command;
/// Output produced by a command (text, nothing, or clear).
pub use interpreter::CommandOutput;
/// Registry of available commands with dispatch.
pub use interpreter::CommandRegistry;
/// Per-invocation environment passed to every command.
pub use interpreter::Environment;
/// Register kernel commands (dmesg, sysctl, lsmod, ...) into a registry.
pub use kernel_commands::register_kernel_commands;
/// Register simulated network commands (ping, ifconfig, curl, ...) into a registry.
pub use network_commands::register_network_commands;
/// Register package manager commands (apt, dpkg, apt-cache) into a registry.
pub use package_commands::register_package_commands;
/// Register process control commands (kill, jobs, nice, ...) into a registry.
pub use process_commands::register_process_commands;
/// One terminal's isolated state.
pub use session::Session;
/// Line-in, text-out facade over a session and a registry.
pub use shell::Shell;
/// Session persistence.
pub use store::{JsonFileStore, MemoryStore, SavedSession, SessionStore};
/// Register system commands (uname, ps, date, clear, ...) into a registry.
pub use system_commands::register_system_commands;
/// Register text processing commands (head, sort, sed, awk, ...) into a registry.
pub use text_commands::register_text_commands;
/// Register user account commands (whoami, su, passwd, ...) into a registry.
pub use user_commands::register_user_commands;
/// Register utility commands (tar, git, ssh, crontab, ...) into a registry.
pub use utility_commands::register_utility_commands;
