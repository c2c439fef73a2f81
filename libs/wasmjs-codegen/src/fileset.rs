//! Materialization of file plans
//!
//! Specs from every target are merged first and output handles are only created
//! once all planners are done, so a later plan can still veto a path claimed by an
//! earlier one.

use crate::error::{Error, Result};
use crate::planner::{FilePlan, FileSpec};
use crate::render::RendererSet;
use std::collections::{BTreeMap, HashMap};
use wasmjs_schema::{GeneratedFile, GenerationResponse};

/// Opaque reference to an output file created by a [`FileHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileHandle(usize);

impl FileHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The host compiler's file-creation API
pub trait FileHost {
    fn create_file(&mut self, path: &str) -> Result<FileHandle>;

    fn write_file(&mut self, handle: FileHandle, content: String) -> Result<()>;
}

/// Collects output files in memory for a single response
#[derive(Debug, Default)]
pub struct MemoryHost {
    files: Vec<(String, Option<String>)>,
    paths: HashMap<String, FileHandle>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn content(&self, path: &str) -> Option<&str> {
        let handle = self.paths.get(path)?;
        self.files[handle.0].1.as_deref()
    }

    /// Response holding every created file, in creation order
    ///
    /// A file that was created but never written is an error.
    pub fn into_response(self) -> Result<GenerationResponse> {
        let mut response = GenerationResponse::empty();
        for (name, content) in self.files {
            let content = content.ok_or_else(|| Error::Output {
                path: name.clone(),
                message: "file was created but never written".to_string(),
            })?;
            response.files.push(GeneratedFile { name, content });
        }
        Ok(response)
    }
}

impl FileHost for MemoryHost {
    fn create_file(&mut self, path: &str) -> Result<FileHandle> {
        if self.paths.contains_key(path) {
            return Err(Error::Output {
                path: path.to_string(),
                message: "file already created".to_string(),
            });
        }
        let handle = FileHandle(self.files.len());
        self.files.push((path.to_string(), None));
        self.paths.insert(path.to_string(), handle);
        Ok(handle)
    }

    fn write_file(&mut self, handle: FileHandle, content: String) -> Result<()> {
        match self.files.get_mut(handle.0) {
            Some((_, slot)) => {
                *slot = Some(content);
                Ok(())
            }
            None => Err(Error::Output {
                path: format!("#{}", handle.0),
                message: "unknown file handle".to_string(),
            }),
        }
    }
}

/// Every planned file of an invocation, keyed by logical name
#[derive(Debug, Default)]
pub struct GeneratedFileSet {
    specs: Vec<FileSpec>,
    index: HashMap<String, usize>,
    handles: BTreeMap<String, FileHandle>,
}

impl GeneratedFileSet {
    /// Merge plans; no output is created yet
    pub fn new(plans: &[FilePlan]) -> Result<Self> {
        let mut set = Self::default();
        for plan in plans {
            for spec in plan.specs() {
                if set.index.contains_key(&spec.name) {
                    return Err(Error::DuplicateName(spec.name.clone()));
                }
                set.index.insert(spec.name.clone(), set.specs.len());
                set.specs.push(spec.clone());
            }
        }
        Ok(set)
    }

    /// Create an output handle for every spec
    ///
    /// Path conflicts across plans are rejected before the first file is created.
    /// Any failure aborts the whole batch.
    pub fn create_files(&mut self, host: &mut dyn FileHost) -> Result<()> {
        self.check_paths()?;
        for spec in &self.specs {
            let handle = host.create_file(&spec.path)?;
            self.handles.insert(spec.name.clone(), handle);
        }
        tracing::debug!(files = self.handles.len(), "Created output files");
        Ok(())
    }

    /// Integrity checks run before rendering
    pub fn validate(&self, renderers: &RendererSet) -> Result<()> {
        let missing: Vec<String> = self
            .specs
            .iter()
            .filter(|s| s.required && !self.handles.contains_key(&s.name))
            .map(|s| s.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingRequired(missing));
        }

        self.check_paths()?;

        if let Some(spec) = self.specs.iter().find(|s| !renderers.is_known(&s.file_type)) {
            return Err(Error::UnknownFileType {
                name: spec.name.clone(),
                file_type: spec.file_type.clone(),
            });
        }
        Ok(())
    }

    /// Handles of every spec with the given type tag
    pub fn files_by_type(&self, file_type: &str) -> BTreeMap<String, FileHandle> {
        self.specs
            .iter()
            .filter(|s| s.file_type == file_type)
            .filter_map(|s| self.handles.get(&s.name).map(|h| (s.name.clone(), *h)))
            .collect()
    }

    pub fn file_spec(&self, name: &str) -> Option<&FileSpec> {
        self.index.get(name).map(|&idx| &self.specs[idx])
    }

    pub fn handle(&self, name: &str) -> Option<FileHandle> {
        self.handles.get(name).copied()
    }

    /// Specs in plan order
    pub fn specs(&self) -> impl Iterator<Item = &FileSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    fn check_paths(&self) -> Result<()> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for spec in &self.specs {
            if let Some(first) = seen.insert(&spec.path, &spec.name) {
                return Err(Error::DuplicatePath {
                    path: spec.path.clone(),
                    first: first.to_string(),
                    second: spec.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::planner::file_types;

    fn plan(target: &str, specs: Vec<FileSpec>) -> FilePlan {
        let mut plan = FilePlan::new(target, &GeneratorConfig::default());
        for spec in specs {
            plan.push(spec).unwrap();
        }
        plan.finish()
    }

    #[test]
    fn test_cross_plan_path_conflict_blocks_creation() {
        let a = plan("a", vec![FileSpec::new("a:bundle", "out.ts", file_types::BUNDLE)]);
        let b = plan("b", vec![FileSpec::new("b:bundle", "out.ts", file_types::BUNDLE)]);
        let mut set = GeneratedFileSet::new(&[a, b]).unwrap();

        let mut host = MemoryHost::new();
        let err = set.create_files(&mut host).unwrap_err();
        assert!(matches!(err, Error::DuplicatePath { path, .. } if path == "out.ts"));
        assert!(host.is_empty());
    }

    #[test]
    fn test_required_spec_without_handle() {
        let p = plan(
            "ts",
            vec![FileSpec::new("ts:bundle", "b.ts", file_types::BUNDLE).required(true)],
        );
        let set = GeneratedFileSet::new(&[p]).unwrap();
        let err = set.validate(&RendererSet::with_defaults()).unwrap_err();
        assert!(matches!(err, Error::MissingRequired(names) if names == vec!["ts:bundle"]));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let p = plan("ts", vec![FileSpec::new("ts:odd", "odd.ts", "odd")]);
        let mut set = GeneratedFileSet::new(&[p]).unwrap();
        set.create_files(&mut MemoryHost::new()).unwrap();
        let err = set.validate(&RendererSet::with_defaults()).unwrap_err();
        assert!(matches!(err, Error::UnknownFileType { file_type, .. } if file_type == "odd"));
    }

    #[test]
    fn test_lookup_by_type_and_name() {
        let p = plan(
            "ts",
            vec![
                FileSpec::new("ts:models:a", "a/models.ts", file_types::MODELS),
                FileSpec::new("ts:models:b", "b/models.ts", file_types::MODELS),
                FileSpec::new("ts:bundle", "bundle.ts", file_types::BUNDLE),
            ],
        );
        let mut set = GeneratedFileSet::new(&[p]).unwrap();
        let mut host = MemoryHost::new();
        set.create_files(&mut host).unwrap();
        set.validate(&RendererSet::with_defaults()).unwrap();

        let models = set.files_by_type(file_types::MODELS);
        assert_eq!(
            models.keys().collect::<Vec<_>>(),
            vec!["ts:models:a", "ts:models:b"]
        );
        assert_eq!(set.file_spec("ts:bundle").unwrap().path, "bundle.ts");
        assert!(set.file_spec("missing").is_none());
    }

    #[test]
    fn test_unwritten_file_fails_response() {
        let mut host = MemoryHost::new();
        let handle = host.create_file("a.ts").unwrap();
        host.create_file("b.ts").unwrap();
        host.write_file(handle, "a".to_string()).unwrap();
        assert!(host.into_response().is_err());
    }
}
