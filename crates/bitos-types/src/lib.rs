//! Foundation types for the BitOS terminal.
//!
//! This crate contains the types shared by all BitOS crates: the error
//! taxonomy every command reports through, and the terminal configuration.

pub mod config;
pub mod error;
