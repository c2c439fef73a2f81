use super::index::TypeIndex;
use crate::filter::{CollectedEnum, CollectedMessage};
use crate::paths::dir_of;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use wasmjs_schema::{MethodDef, SchemaFile, ServiceDef};

/// A package and every visible file contributing to it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageInfo {
    pub name: String,
    /// Directory form of the package name ("library/v1")
    pub path: String,
    /// Paths of all visible files declaring this package
    pub files: BTreeSet<String>,
    /// Directories of those files
    pub directories: BTreeSet<String>,
    /// Directories whose files declare at least one generated message or enum
    pub type_directories: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct MethodArtifact<'a> {
    pub method: &'a MethodDef,
    /// Call name exposed to JS and the host wrapper
    pub exposed_name: String,
    pub is_async: bool,
    pub timeout_ms: Option<u32>,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ServiceArtifact<'a> {
    pub service: &'a ServiceDef,
    /// Key into `ArtifactCatalog::packages`
    pub package: String,
    pub file: &'a SchemaFile,
    pub exposed_name: String,
    pub is_browser: bool,
    /// Methods that passed filtering, in declaration order
    pub methods: Vec<MethodArtifact<'a>>,
    pub reason: String,
}

impl ServiceArtifact<'_> {
    pub fn name(&self) -> &str {
        &self.service.name
    }

    pub fn directory(&self) -> &str {
        dir_of(&self.file.path)
    }

    /// Fully qualified service name (".library.v1.LibraryService")
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.file.scope(), self.service.name)
    }
}

/// Messages of one package declared in one directory
#[derive(Debug, Clone)]
pub struct MessageArtifact<'a> {
    pub package: String,
    pub directory: String,
    pub messages: Vec<CollectedMessage<'a>>,
}

/// Enums of one package declared in one directory
#[derive(Debug, Clone)]
pub struct EnumArtifact<'a> {
    pub package: String,
    pub directory: String,
    pub enums: Vec<CollectedEnum<'a>>,
}

/// A factory-marked schema file and the messages its factory covers
#[derive(Debug, Clone)]
pub struct FactoryArtifact<'a> {
    pub file: &'a SchemaFile,
    pub package: String,
    pub directory: String,
    /// Messages of the file and of its same-package imports, transitively, by full name
    pub messages: Vec<CollectedMessage<'a>>,
}

/// Everything one invocation can generate
///
/// Services, browser services and groups are sorted by (package, name/directory).
#[derive(Debug, Clone, Default)]
pub struct ArtifactCatalog<'a> {
    pub services: Vec<ServiceArtifact<'a>>,
    pub browser_services: Vec<ServiceArtifact<'a>>,
    pub messages: Vec<MessageArtifact<'a>>,
    pub enums: Vec<EnumArtifact<'a>>,
    pub factories: Vec<FactoryArtifact<'a>>,
    pub packages: BTreeMap<String, PackageInfo>,
    pub types: TypeIndex,
}

impl<'a> ArtifactCatalog<'a> {
    /// Nothing to generate for this invocation
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
            && self.browser_services.is_empty()
            && self.messages.is_empty()
            && self.enums.is_empty()
            && self.factories.is_empty()
    }

    /// Ordinary and browser services together, ordered by (package, name)
    pub fn all_services(&self) -> Vec<&ServiceArtifact<'a>> {
        let mut all: Vec<_> = self
            .services
            .iter()
            .chain(self.browser_services.iter())
            .collect();
        all.sort_by(|a, b| (&a.package, a.name()).cmp(&(&b.package, b.name())));
        all
    }

    pub fn find_service(&self, package: &str, name: &str) -> Option<&ServiceArtifact<'a>> {
        self.services
            .iter()
            .chain(self.browser_services.iter())
            .find(|s| s.package == package && s.name() == name)
    }

    pub fn message_group(&self, package: &str, directory: &str) -> Option<&MessageArtifact<'a>> {
        self.messages
            .iter()
            .find(|g| g.package == package && g.directory == directory)
    }

    pub fn enum_group(&self, package: &str, directory: &str) -> Option<&EnumArtifact<'a>> {
        self.enums
            .iter()
            .find(|g| g.package == package && g.directory == directory)
    }

    /// (package, directory) keys of every message or enum group, sorted
    pub fn type_groups(&self) -> BTreeSet<(String, String)> {
        self.messages
            .iter()
            .map(|g| (g.package.clone(), g.directory.clone()))
            .chain(
                self.enums
                    .iter()
                    .map(|g| (g.package.clone(), g.directory.clone())),
            )
            .collect()
    }

    /// (package, directory) pairs that own at least one included service
    pub fn service_groups(&self) -> BTreeSet<(&str, &str)> {
        self.services
            .iter()
            .chain(self.browser_services.iter())
            .map(|s| (s.package.as_str(), s.directory()))
            .collect()
    }

    pub fn package(&self, name: &str) -> Option<&PackageInfo> {
        self.packages.get(name)
    }

    /// Artifacts whose package is missing from the registry
    pub(crate) fn dangling_packages(&self) -> Vec<String> {
        let mut missing: BTreeSet<String> = BTreeSet::new();
        let packages = self
            .services
            .iter()
            .chain(self.browser_services.iter())
            .map(|s| &s.package)
            .chain(self.messages.iter().map(|g| &g.package))
            .chain(self.enums.iter().map(|g| &g.package))
            .chain(self.factories.iter().map(|f| &f.package));
        for package in packages {
            if !self.packages.contains_key(package) {
                missing.insert(package.clone());
            }
        }
        missing.into_iter().collect()
    }
}
