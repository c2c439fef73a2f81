//! Subcommand implementations

use anyhow::{Context, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use wasmjs_codegen::FilePlan;
use wasmjs_schema::{GenerationRequest, GenerationResponse};

/// Plugin exchange: one request frame in, one response frame out
///
/// Nothing reaches `output` unless generation succeeded.
pub fn run_plugin<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<usize> {
    let request = wasmjs_schema::read_request(input).context("reading plugin request")?;
    tracing::info!(
        files = request.schema_files.len(),
        emit = request.files_to_generate.len(),
        compiler = request.compiler_version.as_deref().unwrap_or("unknown"),
        "Plugin request received"
    );

    let response = wasmjs_codegen::generate(&request).context("generating files")?;
    wasmjs_schema::write_response(output, &response).context("writing plugin response")?;
    output.flush().context("flushing plugin response")?;
    Ok(response.files.len())
}

/// Load an unframed JSON request, optionally replacing its parameter
pub fn load_request(path: &Path, parameter: Option<&str>) -> Result<GenerationRequest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading request {}", path.display()))?;
    let mut request: GenerationRequest = serde_json::from_str(&raw)
        .with_context(|| format!("parsing request {}", path.display()))?;
    if let Some(parameter) = parameter {
        request.parameter = Some(parameter.to_string());
    }
    Ok(request)
}

/// Run the pipeline and write every generated file below `out_dir`
pub fn generate_to_dir(request: &GenerationRequest, out_dir: &Path) -> Result<usize> {
    let response = wasmjs_codegen::generate(request).context("generating files")?;
    write_files(out_dir, &response)?;
    tracing::info!(
        files = response.files.len(),
        out = %out_dir.display(),
        "Wrote generated files"
    );
    Ok(response.files.len())
}

/// Write response files below `out_dir`, creating directories as needed
pub fn write_files(out_dir: &Path, response: &GenerationResponse) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    for file in &response.files {
        let path = out_dir.join(&file.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("writing generated file {}", path.display()))?;
    }

    Ok(())
}

/// Every target's plan, pretty-printed
pub fn plan_json(request: &GenerationRequest) -> Result<String> {
    let plans: Vec<FilePlan> = wasmjs_codegen::plan(request).context("planning files")?;
    serde_json::to_string_pretty(&plans).context("serializing plans")
}
