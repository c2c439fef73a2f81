//! Client-side (TypeScript) file planning

use super::{file_types, meta, package_module, spec_name, ContentHints, FilePlan, FilePlanner, FileSpec};
use crate::collector::{ArtifactCatalog, ServiceArtifact};
use crate::config::{GeneratorConfig, OutputStructure};
use crate::error::Result;
use crate::naming::{file_stem, service_client_stem, to_snake};
use crate::paths::{join, package_to_dir};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct TsPlanner;

impl TsPlanner {
    pub const TARGET: &'static str = "ts";

    pub fn new() -> Self {
        Self
    }
}

/// Client path relative to the client output root
pub fn client_path(package: &str, service: &str, structure: OutputStructure) -> String {
    match structure {
        OutputStructure::Namespaced => join(&[
            &package_to_dir(package),
            &format!("{}.ts", service_client_stem(service)),
        ]),
        OutputStructure::Flat => format!("{}.ts", service_client_stem(service)),
        OutputStructure::ServiceBased => join(&[&to_snake(service), "client.ts"]),
    }
}

/// Per-package barrel path relative to the client output root
pub fn package_index_path(package: &str, config: &GeneratorConfig) -> String {
    format!("{}.ts", package_module(package, config))
}

/// Type file path (`interfaces`, `models`, `schemas`) relative to the client output root
pub fn type_file_path(directory: &str, file_type: &str) -> String {
    join(&[directory, &format!("{file_type}.ts")])
}

pub fn bundle_path(config: &GeneratorConfig) -> String {
    format!("{}_bundle.ts", config.module_name)
}

impl FilePlanner for TsPlanner {
    fn target(&self) -> &'static str {
        Self::TARGET
    }

    fn plan(&self, catalog: &ArtifactCatalog<'_>, config: &GeneratorConfig) -> Result<FilePlan> {
        let mut plan = FilePlan::new(Self::TARGET, config);
        if !config.generate_ts {
            tracing::debug!("Client target disabled");
            return Ok(plan.finish());
        }

        let root = config.ts_export_path.as_str();

        for service in catalog.all_services() {
            plan.push(client_spec(service, root, config))?;
        }

        if config.generate_types {
            self.plan_types(catalog, config, &mut plan)?;
        }

        plan.push(
            FileSpec::new(
                spec_name(Self::TARGET, file_types::BUNDLE, &config.module_name),
                join(&[root, &bundle_path(config)]),
                file_types::BUNDLE,
            )
            .required(true)
            .with_meta(meta::MODULE_NAME, config.module_name.as_str()),
        )?;

        let plan = plan.finish();
        tracing::info!(target_name = Self::TARGET, files = plan.len(), "Planned client files");
        Ok(plan)
    }
}

impl TsPlanner {
    fn plan_types(
        &self,
        catalog: &ArtifactCatalog<'_>,
        config: &GeneratorConfig,
        plan: &mut FilePlan,
    ) -> Result<()> {
        let root = config.ts_export_path.as_str();
        let mut packages: BTreeSet<&str> = BTreeSet::new();

        for (package, directory) in catalog.type_groups() {
            let hints = ContentHints {
                has_messages: catalog.message_group(&package, &directory).is_some(),
                has_enums: catalog.enum_group(&package, &directory).is_some(),
                ..ContentHints::default()
            };

            let mut kinds = vec![(file_types::INTERFACES, true), (file_types::MODELS, true)];
            if config.generate_schemas {
                kinds.push((file_types::SCHEMAS, false));
            }
            for (file_type, required) in kinds {
                plan.push(
                    FileSpec::new(
                        spec_name(Self::TARGET, file_type, &format!("{package}@{directory}")),
                        join(&[root, &type_file_path(&directory, file_type)]),
                        file_type,
                    )
                    .required(required)
                    .with_hints(hints)
                    .with_meta(meta::PACKAGE, package.as_str())
                    .with_meta(meta::DIRECTORY, directory.as_str()),
                )?;
            }

            if let Some(info) = catalog.package(&package) {
                packages.insert(info.name.as_str());
            }
        }

        for package in packages {
            plan.push(
                FileSpec::new(
                    spec_name(Self::TARGET, file_types::PACKAGE_INDEX, package),
                    join(&[root, &package_index_path(package, config)]),
                    file_types::PACKAGE_INDEX,
                )
                .with_hints(ContentHints {
                    has_messages: true,
                    ..ContentHints::default()
                })
                .with_meta(meta::PACKAGE, package),
            )?;
        }

        for factory in &catalog.factories {
            let stem = file_stem(&factory.file.path);
            plan.push(
                FileSpec::new(
                    spec_name(Self::TARGET, file_types::FACTORY, &factory.file.path),
                    join(&[root, &factory.directory, &format!("{stem}_factory.ts")]),
                    file_types::FACTORY,
                )
                .with_hints(ContentHints {
                    has_messages: !factory.messages.is_empty(),
                    ..ContentHints::default()
                })
                .with_meta(meta::PACKAGE, factory.package.as_str())
                .with_meta(meta::DIRECTORY, factory.directory.as_str())
                .with_meta(meta::SOURCE_FILE, factory.file.path.as_str()),
            )?;
        }
        Ok(())
    }
}

fn client_spec(service: &ServiceArtifact<'_>, root: &str, config: &GeneratorConfig) -> FileSpec {
    let file_type = if service.is_browser {
        file_types::BROWSER_SERVICE
    } else {
        file_types::SERVICE_CLIENT
    };
    let hints = ContentHints {
        has_services: !service.is_browser,
        has_browser_services: service.is_browser,
        ..ContentHints::default()
    };
    let key = service.full_name();
    let path = join(&[root, &client_path(&service.package, service.name(), config.structure)]);

    tracing::debug!(service = %key, path = %path, file_type, "Planned client");
    FileSpec::new(
        spec_name(TsPlanner::TARGET, file_type, key.trim_start_matches('.')),
        path,
        file_type,
    )
    .required(true)
    .with_hints(hints)
    .with_meta(meta::PACKAGE, service.package.as_str())
    .with_meta(meta::SERVICE, service.name())
    .with_meta(meta::SOURCE_FILE, service.file.path.as_str())
}
