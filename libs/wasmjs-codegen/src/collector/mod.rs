//! Artifact collection
//!
//! Builds the invocation-wide [`ArtifactCatalog`]:
//! 1. package registry and type index from every visible file (emit flag ignored)
//! 2. services of emitted files, filtered and split into ordinary vs browser-provided
//! 3. message and enum groups of emitted files, per (package, directory)
//!
//! Either the whole catalog is returned or an error; never a partial catalog.

mod catalog;
mod index;

pub use catalog::{
    ArtifactCatalog, EnumArtifact, FactoryArtifact, MessageArtifact, MethodArtifact, PackageInfo, ServiceArtifact,
};
pub use index::{MapEntryTypes, TypeEntry, TypeIndex, TypeKind};

use crate::analyzer::{AnnotationAnalyzer, SchemaAnalyzer};
use crate::config::GeneratorConfig;
use crate::data::export_fn;
use crate::error::{Error, Result};
use crate::filter::{
    collect_enums, collect_messages, exposed_method_name, exposed_service_name,
    should_include_method, should_include_service, FilterCriteria,
};
use crate::naming::to_snake;
use crate::paths::{dir_of, package_to_dir};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use wasmjs_schema::{SchemaFile, SchemaSet};

/// Collect with the default annotation analyzer
pub fn collect_all_artifacts<'a>(
    schema: &'a SchemaSet,
    config: &GeneratorConfig,
    criteria: &FilterCriteria,
) -> Result<ArtifactCatalog<'a>> {
    ArtifactCollector::new(&AnnotationAnalyzer).collect(schema, config, criteria)
}

pub struct ArtifactCollector<'x> {
    analyzer: &'x dyn SchemaAnalyzer,
}

impl<'x> ArtifactCollector<'x> {
    pub fn new(analyzer: &'x dyn SchemaAnalyzer) -> Self {
        Self { analyzer }
    }

    pub fn collect<'a>(
        &self,
        schema: &'a SchemaSet,
        config: &GeneratorConfig,
        criteria: &FilterCriteria,
    ) -> Result<ArtifactCatalog<'a>> {
        let types = TypeIndex::build(schema.files(), self.analyzer)?;
        let packages = build_package_registry(schema.files(), &types);

        let mut catalog = ArtifactCatalog {
            packages,
            types,
            ..ArtifactCatalog::default()
        };

        let mut emitted: Vec<&'a SchemaFile> = schema.emitted().collect();
        emitted.sort_by(|a, b| (&a.package, &a.path).cmp(&(&b.package, &b.path)));

        for &file in &emitted {
            self.collect_services(file, criteria, &mut catalog)?;
        }
        catalog
            .services
            .sort_by(|a, b| (&a.package, a.name()).cmp(&(&b.package, b.name())));
        catalog
            .browser_services
            .sort_by(|a, b| (&a.package, a.name()).cmp(&(&b.package, b.name())));

        if config.generate_types {
            self.collect_types(&emitted, &mut catalog);
            self.collect_factories(schema, &emitted, &mut catalog);
        }

        let dangling = catalog.dangling_packages();
        if let Some(package) = dangling.first() {
            return Err(Error::Collection {
                package: package.clone(),
                file: String::new(),
                message: "artifact references a package missing from the registry".to_string(),
            });
        }

        tracing::info!(
            packages = catalog.packages.len(),
            services = catalog.services.len(),
            browser_services = catalog.browser_services.len(),
            message_groups = catalog.messages.len(),
            enum_groups = catalog.enums.len(),
            factories = catalog.factories.len(),
            "Artifact collection complete"
        );

        Ok(catalog)
    }

    fn collect_services<'a>(
        &self,
        file: &'a SchemaFile,
        criteria: &FilterCriteria,
        catalog: &mut ArtifactCatalog<'a>,
    ) -> Result<()> {
        for service in &file.services {
            let decision = should_include_service(service, self.analyzer, criteria);
            tracing::debug!(
                service = %service.name,
                package = %file.package,
                include = decision.include,
                reason = %decision.reason,
                "Service filter decision"
            );
            if !decision.include {
                continue;
            }

            if catalog.find_service(&file.package, &service.name).is_some() {
                return Err(Error::Collection {
                    package: file.package.clone(),
                    file: file.path.clone(),
                    message: format!("service {} is declared more than once", service.name),
                });
            }

            let exposed_service = exposed_service_name(service, self.analyzer);
            if let Some(other) = catalog.all_services().into_iter().find(|s| {
                s.package == file.package && to_snake(&s.exposed_name) == to_snake(&exposed_service)
            }) {
                return Err(Error::Collection {
                    package: file.package.clone(),
                    file: file.path.clone(),
                    message: format!(
                        "services {} and {} both register as {}",
                        other.name(),
                        service.name,
                        to_snake(&exposed_service)
                    ),
                });
            }

            let mut exports: BTreeMap<String, &str> = BTreeMap::new();
            let mut methods = Vec::new();
            for method in &service.methods {
                let method_decision = should_include_method(method, self.analyzer, criteria);
                tracing::debug!(
                    service = %service.name,
                    method = %method.name,
                    include = method_decision.include,
                    reason = %method_decision.reason,
                    "Method filter decision"
                );
                if !method_decision.include {
                    continue;
                }

                for type_name in [&method.input_type, &method.output_type] {
                    if catalog.types.message(type_name).is_none() {
                        return Err(Error::Collection {
                            package: file.package.clone(),
                            file: file.path.clone(),
                            message: format!(
                                "method {}.{} references unknown message {type_name}",
                                service.name, method.name
                            ),
                        });
                    }
                }

                let exposed = exposed_method_name(method, self.analyzer, criteria);
                let export = export_fn(&exposed_service, &exposed);
                if let Some(previous) = exports.insert(export.clone(), &method.name) {
                    return Err(Error::Collection {
                        package: file.package.clone(),
                        file: file.path.clone(),
                        message: format!(
                            "methods {}.{previous} and {}.{} both export as {export}",
                            service.name, service.name, method.name
                        ),
                    });
                }

                let options = self.analyzer.async_options(method);
                methods.push(MethodArtifact {
                    method,
                    exposed_name: exposed,
                    is_async: options.is_async,
                    timeout_ms: options.timeout_ms,
                    reason: method_decision.reason,
                });
            }

            let is_browser = self.analyzer.is_browser_provided(service);
            let artifact = ServiceArtifact {
                service,
                package: file.package.clone(),
                file,
                exposed_name: exposed_service,
                is_browser,
                methods,
                reason: decision.reason,
            };
            if is_browser {
                catalog.browser_services.push(artifact);
            } else {
                catalog.services.push(artifact);
            }
        }
        Ok(())
    }

    fn collect_types<'a>(&self, emitted: &[&'a SchemaFile], catalog: &mut ArtifactCatalog<'a>) {
        let mut by_package: BTreeMap<&str, Vec<&'a SchemaFile>> = BTreeMap::new();
        for &file in emitted {
            by_package.entry(file.package.as_str()).or_default().push(file);
        }

        for (package, files) in by_package {
            for (directory, messages) in collect_messages(&files, self.analyzer) {
                catalog.messages.push(MessageArtifact {
                    package: package.to_string(),
                    directory,
                    messages,
                });
            }
            for (directory, enums) in collect_enums(&files, self.analyzer) {
                catalog.enums.push(EnumArtifact {
                    package: package.to_string(),
                    directory,
                    enums,
                });
            }
        }
    }

    /// One factory per marked emitted file
    ///
    /// Imports are followed transitively but only while they stay inside the marked
    /// file's package; another package's messages belong to that package's factory.
    fn collect_factories<'a>(
        &self,
        schema: &'a SchemaSet,
        emitted: &[&'a SchemaFile],
        catalog: &mut ArtifactCatalog<'a>,
    ) {
        for &file in emitted {
            if !self.analyzer.has_factory_marker(file) {
                continue;
            }

            let mut visited: BTreeSet<&str> = BTreeSet::new();
            let mut reachable: Vec<&'a SchemaFile> = Vec::new();
            let mut queue: VecDeque<&'a SchemaFile> = VecDeque::from([file]);
            while let Some(current) = queue.pop_front() {
                if !visited.insert(current.path.as_str()) {
                    continue;
                }
                reachable.push(current);
                for import in &current.imports {
                    match schema.get(import) {
                        Some(imported) if imported.package == file.package => {
                            queue.push_back(imported)
                        }
                        Some(imported) => tracing::trace!(
                            file = %file.path,
                            import = %imported.path,
                            "Factory skips cross-package import"
                        ),
                        None => {}
                    }
                }
            }

            let mut messages: Vec<_> = collect_messages(&reachable, self.analyzer)
                .into_values()
                .flatten()
                .collect();
            messages.sort_by(|a, b| a.full_name.cmp(&b.full_name));

            tracing::debug!(
                file = %file.path,
                reachable_files = reachable.len(),
                messages = messages.len(),
                "Factory marker found"
            );
            catalog.factories.push(FactoryArtifact {
                file,
                package: file.package.clone(),
                directory: dir_of(&file.path).to_string(),
                messages,
            });
        }
        catalog
            .factories
            .sort_by(|a, b| a.file.path.cmp(&b.file.path));
    }
}

fn build_package_registry(files: &[SchemaFile], types: &TypeIndex) -> BTreeMap<String, PackageInfo> {
    let mut packages: BTreeMap<String, PackageInfo> = BTreeMap::new();
    for file in files {
        let info = packages
            .entry(file.package.clone())
            .or_insert_with(|| PackageInfo {
                name: file.package.clone(),
                path: package_to_dir(&file.package),
                ..PackageInfo::default()
            });
        info.files.insert(file.path.clone());
        info.directories.insert(dir_of(&file.path).to_string());
    }

    let mut type_dirs: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    for entry in types.iter().filter(|e| e.is_generated()) {
        type_dirs
            .entry(entry.package.as_str())
            .or_default()
            .insert(entry.directory.clone());
    }
    for (package, dirs) in type_dirs {
        if let Some(info) = packages.get_mut(package) {
            info.type_directories = dirs;
        }
    }

    packages
}
