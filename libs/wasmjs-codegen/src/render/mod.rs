//! Text rendering
//!
//! Each target has a renderer that turns built template data into file text.
//! Renderers return errors for mismatched data and never panic.

mod ts;
mod wasm;

pub use ts::TsRenderer;
pub use wasm::WasmRenderer;

use crate::data::TemplateData;
use crate::error::{Error, Result};
use crate::planner::FileSpec;

/// Header placed on every generated file
pub const GENERATED_HEADER: &str = "Code generated by wasmjs-gen. DO NOT EDIT.";

/// Renders files of one or more type tags
pub trait Renderer {
    /// Type tags this renderer understands
    fn file_types(&self) -> &[&'static str];

    /// Render deterministic text for one file
    fn render(&self, spec: &FileSpec, data: &TemplateData) -> anyhow::Result<String>;
}

/// Registry of renderers keyed by file type
pub struct RendererSet {
    renderers: Vec<Box<dyn Renderer>>,
}

impl RendererSet {
    pub fn new() -> Self {
        Self {
            renderers: Vec::new(),
        }
    }

    /// Host and client renderers
    pub fn with_defaults() -> Self {
        Self::new()
            .with(Box::new(WasmRenderer::new()))
            .with(Box::new(TsRenderer::new()))
    }

    pub fn with(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderers.push(renderer);
        self
    }

    pub fn is_known(&self, file_type: &str) -> bool {
        self.renderer_for(file_type).is_some()
    }

    fn renderer_for(&self, file_type: &str) -> Option<&dyn Renderer> {
        self.renderers
            .iter()
            .find(|r| r.file_types().iter().any(|t| *t == file_type))
            .map(|r| r.as_ref())
    }

    pub fn render(&self, spec: &FileSpec, data: &TemplateData) -> Result<String> {
        let renderer = self
            .renderer_for(&spec.file_type)
            .ok_or_else(|| Error::UnknownFileType {
                name: spec.name.clone(),
                file_type: spec.file_type.clone(),
            })?;
        renderer.render(spec, data).map_err(|e| Error::Render {
            name: spec.name.clone(),
            message: format!("{e:#}"),
        })
    }
}

impl Default for RendererSet {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Doc comment lines with the given prefix, one per source line
pub(crate) fn comment_lines(out: &mut String, indent: &str, prefix: &str, comment: Option<&str>) {
    if let Some(comment) = comment {
        for line in comment.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                out.push_str(&format!("{indent}{}\n", prefix.trim_end()));
            } else {
                out.push_str(&format!("{indent}{prefix}{line}\n"));
            }
        }
    }
}

fn mismatch(spec: &FileSpec, data: &TemplateData) -> anyhow::Error {
    let kind = match data {
        TemplateData::WasmWrapper(_) => "wasm_wrapper",
        TemplateData::MainExample(_) => "main_example",
        TemplateData::BuildScript(_) => "build_script",
        TemplateData::Client(_) => "client",
        TemplateData::Types(_) => "types",
        TemplateData::PackageIndex(_) => "package_index",
        TemplateData::Factory(_) => "factory",
        TemplateData::Bundle(_) => "bundle",
    };
    anyhow::anyhow!("{} data cannot render a {} file", kind, spec.file_type)
}
