//! Host-side (Rust, compiled to WebAssembly) file planning

use super::{file_types, meta, package_module, spec_name, ContentHints, FilePlan, FilePlanner, FileSpec};
use crate::collector::ArtifactCatalog;
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::paths::join;

/// One wrapper per (package, directory) owning included services, plus the module-level
/// example entry point and build script
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmPlanner;

impl WasmPlanner {
    pub const TARGET: &'static str = "wasm";

    pub fn new() -> Self {
        Self
    }
}

impl FilePlanner for WasmPlanner {
    fn target(&self) -> &'static str {
        Self::TARGET
    }

    fn plan(&self, catalog: &ArtifactCatalog<'_>, config: &GeneratorConfig) -> Result<FilePlan> {
        let mut plan = FilePlan::new(Self::TARGET, config);
        if !config.generate_wasm {
            tracing::debug!("Host target disabled");
            return Ok(plan.finish());
        }

        let root = config.wasm_export_path.as_str();
        let groups = catalog.service_groups();

        // keyed by directory as well as package: overlapping invocations never share a wrapper
        for &(package, directory) in &groups {
            let services: Vec<_> = catalog
                .all_services()
                .into_iter()
                .filter(|s| s.package == package && s.directory() == directory)
                .collect();
            let names: Vec<&str> = services.iter().map(|s| s.name()).collect();
            let hints = ContentHints {
                has_services: services.iter().any(|s| !s.is_browser),
                has_browser_services: services.iter().any(|s| s.is_browser),
                ..ContentHints::default()
            };

            let module = package_module(package, config);
            let path = join(&[root, directory, &format!("{module}_wasm.rs")]);
            plan.push(
                FileSpec::new(
                    spec_name(
                        Self::TARGET,
                        file_types::WASM_WRAPPER,
                        &format!("{package}@{directory}"),
                    ),
                    path,
                    file_types::WASM_WRAPPER,
                )
                .required(true)
                .with_hints(hints)
                .with_meta(meta::PACKAGE, package)
                .with_meta(meta::DIRECTORY, directory)
                .with_meta(meta::SERVICES, names),
            )?;
        }

        if !groups.is_empty() {
            let example_hints = ContentHints {
                is_example: true,
                ..ContentHints::default()
            };
            plan.push(
                FileSpec::new(
                    spec_name(Self::TARGET, file_types::MAIN_EXAMPLE, &config.module_name),
                    join(&[root, "main.rs.example"]),
                    file_types::MAIN_EXAMPLE,
                )
                .with_hints(example_hints)
                .with_meta(meta::MODULE_NAME, config.module_name.as_str()),
            )?;

            if config.generate_build_script {
                plan.push(
                    FileSpec::new(
                        spec_name(Self::TARGET, file_types::BUILD_SCRIPT, &config.module_name),
                        join(&[root, "build.sh"]),
                        file_types::BUILD_SCRIPT,
                    )
                    .with_meta(meta::MODULE_NAME, config.module_name.as_str()),
                )?;
            }
        }

        let plan = plan.finish();
        tracing::info!(target_name = Self::TARGET, files = plan.len(), "Planned host files");
        Ok(plan)
    }
}
