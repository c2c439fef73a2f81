//! Error types for artifact collection and file planning

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid rename rule '{entry}': {reason}")]
    InvalidRename { entry: String, reason: String },

    #[error("Unknown output structure '{0}' (expected one of: namespaced, flat, service_based)")]
    UnknownStructure(String),

    #[error("Invalid method pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Collection error in package '{package}' ({file}): {message}")]
    Collection {
        package: String,
        file: String,
        message: String,
    },

    #[error("Duplicate output path {path}: planned by {first} and {second}")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },

    #[error("Duplicate file name in plan: {0}")]
    DuplicateName(String),

    #[error("Required files have no output handle: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("No renderer for file type '{file_type}' (file {name})")]
    UnknownFileType { name: String, file_type: String },

    #[error("File not found in plan: {0}")]
    UnknownFile(String),

    #[error("Render error for {name}: {message}")]
    Render { name: String, message: String },

    #[error("Output error for {path}: {message}")]
    Output { path: String, message: String },

    #[error("Schema error: {0}")]
    Schema(#[from] wasmjs_schema::Error),
}
