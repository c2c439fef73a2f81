//! Validated schema file set for one invocation

use crate::descriptor::SchemaFile;
use crate::error::{Error, Result};
use crate::protocol::GenerationRequest;
use std::collections::{BTreeSet, HashMap};

/// Every schema file visible to one invocation, in front-end order
///
/// Files listed in `files_to_generate` carry `generate = true`; the rest are
/// visible for lookups (imports, cross-package types) but emit nothing.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    files: Vec<SchemaFile>,
    by_path: HashMap<String, usize>,
}

impl SchemaSet {
    /// Build from a plugin request, stamping emit flags and checking consistency
    pub fn from_request(request: &GenerationRequest) -> Result<Self> {
        Self::new(
            request.schema_files.clone(),
            request.files_to_generate.iter().map(String::as_str),
        )
    }

    pub fn new<'a>(
        files: Vec<SchemaFile>,
        files_to_generate: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        let mut by_path = HashMap::with_capacity(files.len());
        for (idx, file) in files.iter().enumerate() {
            if file.path.is_empty() {
                return Err(Error::InvalidFile {
                    file: format!("#{idx}"),
                    message: "empty path".to_string(),
                });
            }
            if by_path.insert(file.path.clone(), idx).is_some() {
                return Err(Error::DuplicateFile(file.path.clone()));
            }
        }

        let mut wanted = BTreeSet::new();
        for path in files_to_generate {
            if !by_path.contains_key(path) {
                return Err(Error::UnknownFileToGenerate(path.to_string()));
            }
            wanted.insert(path.to_string());
        }

        for file in &files {
            for import in &file.imports {
                if !by_path.contains_key(import) {
                    return Err(Error::UnresolvedImport {
                        file: file.path.clone(),
                        import: import.clone(),
                    });
                }
            }
        }

        let files = files
            .into_iter()
            .map(|mut file| {
                file.generate = wanted.contains(&file.path);
                file
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            files = files.len(),
            emitted = wanted.len(),
            "Schema set loaded"
        );

        Ok(Self { files, by_path })
    }

    /// All visible files, in front-end order
    pub fn files(&self) -> &[SchemaFile] {
        &self.files
    }

    /// Files this invocation emits output for
    pub fn emitted(&self) -> impl Iterator<Item = &SchemaFile> {
        self.files.iter().filter(|f| f.generate)
    }

    pub fn get(&self, path: &str) -> Option<&SchemaFile> {
        self.by_path.get(path).map(|&idx| &self.files[idx])
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
