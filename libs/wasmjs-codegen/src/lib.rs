//! WASM/JS service code generator
//!
//! Turns a schema set (services, messages, enums, imports, annotations) into a
//! Rust host wrapper compiled to WebAssembly and a TypeScript client for the
//! browser, so the same service logic runs on a server or inside a page.
//!
//! ## Architecture
//!
//! The pipeline runs strictly forward:
//! 1. **Config**: the request parameter is parsed into a [`GeneratorConfig`] and
//!    [`FilterCriteria`]; malformed options abort before any schema work
//! 2. **Collector**: every visible schema file feeds the package registry and type
//!    index; emitted files contribute services and directory-scoped type groups
//! 3. **Planners**: each target maps the [`ArtifactCatalog`] onto a [`FilePlan`]
//! 4. **File set**: all plans are merged, checked and materialized at once
//! 5. **Renderers**: per-file template data is built and rendered to text
//!
//! An invocation with nothing to generate returns an empty response.

pub mod analyzer;
pub mod collector;
pub mod config;
pub mod data;
pub mod error;
pub mod fileset;
pub mod filter;
pub mod naming;
pub mod paths;
pub mod planner;
pub mod render;

pub use analyzer::{AnnotationAnalyzer, AsyncOptions, SchemaAnalyzer};
pub use collector::{collect_all_artifacts, ArtifactCatalog, ArtifactCollector};
pub use config::{GeneratorConfig, OutputStructure};
pub use data::{build_template_data, TemplateData};
pub use error::{Error, Result};
pub use fileset::{FileHandle, FileHost, GeneratedFileSet, MemoryHost};
pub use filter::FilterCriteria;
pub use planner::{FilePlan, FilePlanner, FileSpec, TsPlanner, WasmPlanner};
pub use render::{Renderer, RendererSet};

use wasmjs_schema::{GenerationRequest, GenerationResponse, SchemaSet};

/// Run the whole pipeline for one request
pub fn generate(request: &GenerationRequest) -> Result<GenerationResponse> {
    let config = parse_config(request)?;
    let criteria = FilterCriteria::from_config(&config)?;
    let schema = SchemaSet::from_request(request)?;
    let catalog = collect_all_artifacts(&schema, &config, &criteria)?;

    if catalog.is_empty() {
        tracing::info!("Nothing to generate for this invocation");
        return Ok(GenerationResponse::empty());
    }

    let plans = plan_targets(&catalog, &config)?;
    let renderers = RendererSet::with_defaults();

    let mut file_set = GeneratedFileSet::new(&plans)?;
    let mut host = MemoryHost::new();
    file_set.create_files(&mut host)?;
    file_set.validate(&renderers)?;

    for spec in file_set.specs() {
        let handle = file_set
            .handle(&spec.name)
            .ok_or_else(|| Error::UnknownFile(spec.name.clone()))?;
        let data = build_template_data(spec, &catalog, &config)?;
        let content = renderers.render(spec, &data)?;
        tracing::debug!(file = %spec.path, bytes = content.len(), "Rendered file");
        host.write_file(handle, content)?;
    }

    let response = host.into_response()?;
    tracing::info!(files = response.files.len(), "Generation complete");
    Ok(response)
}

/// Run the pipeline up to planning and return every target's plan
pub fn plan(request: &GenerationRequest) -> Result<Vec<FilePlan>> {
    let config = parse_config(request)?;
    let criteria = FilterCriteria::from_config(&config)?;
    let schema = SchemaSet::from_request(request)?;
    let catalog = collect_all_artifacts(&schema, &config, &criteria)?;

    if catalog.is_empty() {
        return Ok(Vec::new());
    }
    plan_targets(&catalog, &config)
}

/// Plans of every built-in target, host first
pub fn plan_targets(catalog: &ArtifactCatalog<'_>, config: &GeneratorConfig) -> Result<Vec<FilePlan>> {
    let planners: [&dyn FilePlanner; 2] = [&WasmPlanner, &TsPlanner];
    planners
        .iter()
        .map(|planner| planner.plan(catalog, config))
        .collect()
}

fn parse_config(request: &GenerationRequest) -> Result<GeneratorConfig> {
    let config = match request.parameter.as_deref() {
        Some(parameter) => GeneratorConfig::from_parameter(parameter)?,
        None => GeneratorConfig::default(),
    };
    tracing::debug!(
        module_name = %config.module_name,
        structure = %config.structure,
        "Parsed generator configuration"
    );
    Ok(config)
}
