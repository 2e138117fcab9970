//! Error types for the BitOS terminal.
//!
//! Every variant renders the way a real shell would print it, so the
//! dispatcher can turn any error into a terminal line without extra
//! formatting. Handlers prefix errors with their program name through
//! [`BitosError::in_command`].

use std::io;

/// Errors produced by the BitOS terminal.
#[derive(Debug, thiserror::Error)]
pub enum BitosError {
    #[error("{0}: No such file or directory")]
    NotFound(String),

    #[error("cannot create directory '{0}': File exists")]
    AlreadyExists(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{target}: {reason}")]
    NotSupported { target: String, reason: String },

    #[error("Command not found: {0}. Type 'help' for a list of available commands.")]
    UnknownCommand(String),

    #[error("{program}: {source}")]
    Command {
        program: String,
        #[source]
        source: Box<BitosError>,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`BitosError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A path or entry does not resolve.
    NotFound,
    /// An entry with that name already exists.
    AlreadyExists,
    /// Missing or malformed argument.
    InvalidArgument,
    /// Directory where a file is required, or vice versa.
    NotSupported,
    /// The typed name matches no registered command.
    UnknownCommand,
    /// Anything that is not a user-facing shell error (I/O, config, ...).
    Internal,
}

impl BitosError {
    /// `target: Is a directory`.
    pub fn is_a_directory(target: impl Into<String>) -> Self {
        Self::NotSupported {
            target: target.into(),
            reason: "Is a directory".to_string(),
        }
    }

    /// `target: Not a directory`.
    pub fn not_a_directory(target: impl Into<String>) -> Self {
        Self::NotSupported {
            target: target.into(),
            reason: "Not a directory".to_string(),
        }
    }

    /// Shorthand for [`BitosError::InvalidArgument`].
    pub fn usage(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Attribute this error to `program`, e.g. `rm: foo: Is a directory`.
    ///
    /// Errors that already carry a program name are returned unchanged.
    pub fn in_command(self, program: &str) -> Self {
        match self {
            Self::Command { .. } => self,
            other => Self::Command {
                program: program.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Classify this error, looking through program attribution.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotSupported { .. } => ErrorKind::NotSupported,
            Self::UnknownCommand(_) => ErrorKind::UnknownCommand,
            Self::Command { source, .. } => source.kind(),
            Self::Config(_) | Self::Io(_) | Self::TomlParse(_) | Self::Json(_) => {
                ErrorKind::Internal
            },
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BitosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let e = BitosError::NotFound("notes.txt".into());
        assert_eq!(format!("{e}"), "notes.txt: No such file or directory");
    }

    #[test]
    fn already_exists_display() {
        let e = BitosError::AlreadyExists("demo".into());
        assert_eq!(
            format!("{e}"),
            "cannot create directory 'demo': File exists"
        );
    }

    #[test]
    fn usage_display_is_verbatim() {
        let e = BitosError::usage("Usage: cat <filename>");
        assert_eq!(format!("{e}"), "Usage: cat <filename>");
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn is_a_directory_display() {
        let e = BitosError::is_a_directory("docs");
        assert_eq!(format!("{e}"), "docs: Is a directory");
        assert_eq!(e.kind(), ErrorKind::NotSupported);
    }

    #[test]
    fn not_a_directory_display() {
        let e = BitosError::not_a_directory("hosts");
        assert_eq!(format!("{e}"), "hosts: Not a directory");
    }

    #[test]
    fn unknown_command_display() {
        let e = BitosError::UnknownCommand("bogus".into());
        let msg = format!("{e}");
        assert!(msg.contains("bogus"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn in_command_prefixes_program() {
        let e = BitosError::NotFound("ghost".into()).in_command("rm");
        assert_eq!(format!("{e}"), "rm: ghost: No such file or directory");
        assert_eq!(e.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn in_command_does_not_double_prefix() {
        let e = BitosError::NotFound("x".into())
            .in_command("cp")
            .in_command("sudo");
        assert_eq!(format!("{e}"), "cp: x: No such file or directory");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: BitosError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
        assert_eq!(e.kind(), ErrorKind::Internal);
    }

    #[test]
    fn toml_error_from_conversion() {
        let bad_toml = "this is [[[not valid toml";
        let toml_err = toml::from_str::<toml::Value>(bad_toml).unwrap_err();
        let e: BitosError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: BitosError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
        assert_eq!(e.kind(), ErrorKind::Internal);
    }

    #[test]
    fn error_is_debug() {
        let e = BitosError::Config("test".into());
        assert!(format!("{e:?}").contains("Config"));
    }
}
