//! Plugin request/response exchange
//!
//! One request frame comes in, one response frame goes out. A frame is a 4-byte
//! big-endian payload length followed by a JSON document.

use crate::descriptor::SchemaFile;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Upper bound for a single frame payload (64 MiB)
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Response feature bit: proto3 `optional` fields are understood
pub const FEATURE_PROTO3_OPTIONAL: u64 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Paths of the files this invocation should emit output for
    #[serde(default)]
    pub files_to_generate: Vec<String>,
    /// Raw option string (`key=value,key=value`)
    #[serde(default)]
    pub parameter: Option<String>,
    /// Every file visible to the front-end, dependencies first
    #[serde(default)]
    pub schema_files: Vec<SchemaFile>,
    #[serde(default)]
    pub compiler_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub files: Vec<GeneratedFile>,
    #[serde(default)]
    pub supported_features: u64,
}

impl GenerationResponse {
    pub fn empty() -> Self {
        Self {
            files: Vec::new(),
            supported_features: FEATURE_PROTO3_OPTIONAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Output path relative to the plugin's output root
    pub name: String,
    pub content: String,
}

/// Read one length-prefixed frame
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; 4];
    reader.read_exact(&mut header)?;
    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(Error::FrameTooLarge {
            len,
            limit: MAX_FRAME_LEN,
        });
    }

    let mut payload = Vec::with_capacity(len);
    let read = reader.take(len as u64).read_to_end(&mut payload)?;
    if read != len {
        return Err(Error::TruncatedFrame {
            expected: len,
            actual: read,
        });
    }
    Ok(payload)
}

/// Write one length-prefixed frame
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_FRAME_LEN {
        return Err(Error::FrameTooLarge {
            len: payload.len(),
            limit: MAX_FRAME_LEN,
        });
    }
    let len = u32::try_from(payload.len()).map_err(|_| Error::FrameTooLarge {
        len: payload.len(),
        limit: MAX_FRAME_LEN,
    })?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

pub fn read_request<R: Read>(reader: &mut R) -> Result<GenerationRequest> {
    let payload = read_frame(reader)?;
    Ok(serde_json::from_slice(&payload)?)
}

/// Serialize fully before writing so a failure never leaves a partial frame
pub fn write_response<W: Write>(writer: &mut W, response: &GenerationResponse) -> Result<()> {
    let payload = serde_json::to_vec(response)?;
    write_frame(writer, &payload)
}
