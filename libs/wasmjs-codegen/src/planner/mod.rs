//! File planning
//!
//! Each output target implements [`FilePlanner`] against the same catalog shape and
//! decides how artifacts map to files: one per service, one per directory group,
//! one per module, or one per annotated schema file.
//!
//! Output paths are pure functions of package, directory, artifact name and target
//! config. Plans are sorted by path before they leave the planner.

mod ts;
mod wasm;

pub use ts::{bundle_path, client_path, package_index_path, type_file_path, TsPlanner};
pub use wasm::WasmPlanner;

use crate::collector::ArtifactCatalog;
use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::naming::package_to_underscore;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// File type tags understood by the built-in renderers
pub mod file_types {
    pub const WASM_WRAPPER: &str = "wasm_wrapper";
    pub const MAIN_EXAMPLE: &str = "main_example";
    pub const BUILD_SCRIPT: &str = "build_script";
    pub const SERVICE_CLIENT: &str = "service_client";
    pub const BROWSER_SERVICE: &str = "browser_service";
    pub const INTERFACES: &str = "interfaces";
    pub const MODELS: &str = "models";
    pub const SCHEMAS: &str = "schemas";
    pub const PACKAGE_INDEX: &str = "package_index";
    pub const FACTORY: &str = "factory";
    pub const BUNDLE: &str = "bundle";
}

/// Metadata keys written by the planners
pub mod meta {
    pub const PACKAGE: &str = "package";
    pub const SERVICE: &str = "service";
    pub const SERVICES: &str = "services";
    pub const DIRECTORY: &str = "directory";
    pub const SOURCE_FILE: &str = "source_file";
    pub const MODULE_NAME: &str = "module_name";
}

/// What a planned file is expected to contain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContentHints {
    pub has_services: bool,
    pub has_browser_services: bool,
    pub has_messages: bool,
    pub has_enums: bool,
    pub is_example: bool,
}

impl ContentHints {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One planned output file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSpec {
    /// Logical name, unique across all plans ("ts:service_client:library.v1.LibraryService")
    pub name: String,
    /// Output path relative to the plugin output root
    pub path: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub required: bool,
    pub hints: ContentHints,
    /// References to the artifacts feeding this file
    pub metadata: BTreeMap<String, Value>,
}

impl FileSpec {
    pub fn new(name: impl Into<String>, path: impl Into<String>, file_type: &str) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            file_type: file_type.to_string(),
            required: false,
            hints: ContentHints::default(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_hints(mut self, hints: ContentHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    pub fn meta_list(&self, key: &str) -> Vec<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Ordered file specs for one target plus the configuration that produced them
#[derive(Debug, Clone, Serialize)]
pub struct FilePlan {
    pub target: String,
    pub config: GeneratorConfig,
    specs: Vec<FileSpec>,
    #[serde(skip)]
    names: HashMap<String, usize>,
    #[serde(skip)]
    paths: HashMap<String, usize>,
}

impl FilePlan {
    pub fn new(target: impl Into<String>, config: &GeneratorConfig) -> Self {
        Self {
            target: target.into(),
            config: config.clone(),
            specs: Vec::new(),
            names: HashMap::new(),
            paths: HashMap::new(),
        }
    }

    /// Add a spec, rejecting duplicate names and output paths
    pub fn push(&mut self, spec: FileSpec) -> Result<()> {
        if self.names.contains_key(&spec.name) {
            return Err(Error::DuplicateName(spec.name));
        }
        if let Some(&idx) = self.paths.get(&spec.path) {
            return Err(Error::DuplicatePath {
                path: spec.path,
                first: self.specs[idx].name.clone(),
                second: spec.name,
            });
        }
        let idx = self.specs.len();
        self.names.insert(spec.name.clone(), idx);
        self.paths.insert(spec.path.clone(), idx);
        self.specs.push(spec);
        Ok(())
    }

    /// Sort by output path; called once planning is complete
    pub fn finish(mut self) -> Self {
        self.specs.sort_by(|a, b| a.path.cmp(&b.path));
        self.reindex();
        self
    }

    pub fn specs(&self) -> &[FileSpec] {
        &self.specs
    }

    pub fn into_specs(self) -> Vec<FileSpec> {
        self.specs
    }

    pub fn get(&self, name: &str) -> Option<&FileSpec> {
        self.names.get(name).map(|&idx| &self.specs[idx])
    }

    pub fn paths(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.path.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    fn reindex(&mut self) {
        self.names = self
            .specs
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.name.clone(), idx))
            .collect();
        self.paths = self
            .specs
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.path.clone(), idx))
            .collect();
    }
}

/// Target-specific file planning policy
pub trait FilePlanner {
    /// Target tag used as the logical-name prefix ("wasm", "ts")
    fn target(&self) -> &'static str;

    fn plan(&self, catalog: &ArtifactCatalog<'_>, config: &GeneratorConfig) -> Result<FilePlan>;
}

/// Module name for a package; the root package borrows the configured module name
pub fn package_module(package: &str, config: &GeneratorConfig) -> String {
    match package_to_underscore(package) {
        name if name.is_empty() => config.module_name.clone(),
        name => name,
    }
}

/// Logical name for a spec: `"{target}:{type}:{key}"`
pub(crate) fn spec_name(target: &str, file_type: &str, key: &str) -> String {
    format!("{target}:{file_type}:{key}")
}
