//! Process entry points for the wasmjs generator
//!
//! The `wasmjs-gen` binary is normally spawned by the schema compiler as a plugin:
//! one framed request on stdin, one framed response on stdout. The developer
//! subcommands run the same pipeline on plain JSON requests from disk.

pub mod commands;
pub mod logging;
