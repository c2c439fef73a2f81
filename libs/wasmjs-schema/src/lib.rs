//! Schema descriptor model for wasmjs code generation
//!
//! This crate is the boundary between the IDL front-end and the generator core.
//! The front-end hands over an ordered list of [`SchemaFile`] records; this crate
//! validates them into a [`SchemaSet`], stamps the per-file emit flag, and provides
//! the length-prefixed request/response exchange used by the plugin process.
//!
//! ## Layout
//!
//! - [`descriptor`]: services, methods, messages, enums and fields
//! - [`annotations`]: identifier-keyed annotation payloads attached to elements
//! - [`set`]: the validated, emit-flagged file set for one invocation
//! - [`protocol`]: request/response records and frame codec

pub mod annotations;
pub mod descriptor;
pub mod error;
pub mod protocol;
pub mod set;

pub use annotations::Annotations;
pub use descriptor::{
    EnumDef, EnumValueDef, FieldDef, FieldKind, FieldLabel, MessageDef, MethodDef, ScalarType,
    SchemaFile, ServiceDef,
};
pub use error::{Error, Result};
pub use protocol::{
    read_frame, read_request, write_frame, write_response, GeneratedFile, GenerationRequest,
    GenerationResponse, FEATURE_PROTO3_OPTIONAL, MAX_FRAME_LEN,
};
pub use set::SchemaSet;
