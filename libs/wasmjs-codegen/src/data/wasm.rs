use super::{export_fn, export_name, missing_artifact, require_meta};
use crate::collector::{ArtifactCatalog, ServiceArtifact};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::naming::{to_shouty_snake, to_snake, to_upper_camel};
use crate::planner::{meta, package_module, FileSpec};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WasmWrapperData {
    pub package: String,
    /// Rust module holding the package's message types (`crate::{module}`)
    pub module: String,
    pub namespace: String,
    pub services: Vec<WasmServiceData>,
    pub browser_services: Vec<WasmServiceData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WasmServiceData {
    pub name: String,
    pub exposed_name: String,
    pub trait_name: String,
    /// thread-local slot holding the registered implementation
    pub slot_name: String,
    pub register_fn: String,
    pub comment: Option<String>,
    pub methods: Vec<WasmMethodData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WasmMethodData {
    pub name: String,
    pub exposed_name: String,
    /// JS-visible export name
    pub export_name: String,
    /// Rust name of the exported function
    pub export_fn: String,
    /// Trait method name, from the declared method name
    pub rust_fn: String,
    pub request_type: String,
    pub response_type: String,
    pub request_type_name: String,
    pub response_type_name: String,
    pub is_async: bool,
    pub timeout_ms: Option<u32>,
    pub server_streaming: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainExampleData {
    pub module_name: String,
    pub namespace: String,
    pub registrations: Vec<MainRegistrationData>,
}

/// One host service the example entry point registers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainRegistrationData {
    /// Wrapper module, `{package module}_wasm`
    pub module: String,
    pub trait_name: String,
    pub register_fn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildScriptData {
    pub module_name: String,
    pub wasm_export_path: String,
    pub ts_export_path: String,
}

pub(super) fn build_wrapper(
    spec: &FileSpec,
    catalog: &ArtifactCatalog<'_>,
    config: &GeneratorConfig,
) -> Result<WasmWrapperData> {
    let package = require_meta(spec, meta::PACKAGE)?;
    let mut data = WasmWrapperData {
        package: package.to_string(),
        module: package_module(package, config),
        namespace: config.js_namespace.clone(),
        services: Vec::new(),
        browser_services: Vec::new(),
    };

    for name in spec.meta_list(meta::SERVICES) {
        let service = catalog
            .find_service(package, name)
            .ok_or_else(|| missing_artifact(spec, format!("service {package}.{name}")))?;
        let service_data = service_data(spec, service, catalog, config)?;
        if service.is_browser {
            data.browser_services.push(service_data);
        } else {
            data.services.push(service_data);
        }
    }
    Ok(data)
}

fn service_data(
    spec: &FileSpec,
    service: &ServiceArtifact<'_>,
    catalog: &ArtifactCatalog<'_>,
    config: &GeneratorConfig,
) -> Result<WasmServiceData> {
    let mut methods = Vec::with_capacity(service.methods.len());
    for artifact in &service.methods {
        let method = artifact.method;
        let request = catalog
            .types
            .message(&method.input_type)
            .ok_or_else(|| missing_artifact(spec, format!("type {}", method.input_type)))?;
        let response = catalog
            .types
            .message(&method.output_type)
            .ok_or_else(|| missing_artifact(spec, format!("type {}", method.output_type)))?;

        methods.push(WasmMethodData {
            name: method.name.clone(),
            exposed_name: artifact.exposed_name.clone(),
            export_name: export_name(&service.exposed_name, &artifact.exposed_name),
            export_fn: export_fn(&service.exposed_name, &artifact.exposed_name),
            rust_fn: to_snake(&method.name),
            request_type: format!(
                "crate::{}::{}",
                package_module(&request.package, config),
                request.type_name
            ),
            response_type: format!(
                "crate::{}::{}",
                package_module(&response.package, config),
                response.type_name
            ),
            request_type_name: request.type_name.clone(),
            response_type_name: response.type_name.clone(),
            is_async: artifact.is_async,
            timeout_ms: artifact.timeout_ms,
            server_streaming: method.server_streaming,
            comment: method.comment.clone(),
        });
    }

    Ok(WasmServiceData {
        name: service.name().to_string(),
        exposed_name: service.exposed_name.clone(),
        trait_name: to_upper_camel(&service.exposed_name),
        slot_name: to_shouty_snake(&service.exposed_name),
        register_fn: format!("register_{}", to_snake(&service.exposed_name)),
        comment: service.service.comment.clone(),
        methods,
    })
}

pub(super) fn build_main_example(catalog: &ArtifactCatalog<'_>, config: &GeneratorConfig) -> MainExampleData {
    let registrations = catalog
        .services
        .iter()
        .map(|service| MainRegistrationData {
            module: format!("{}_wasm", package_module(&service.package, config)),
            trait_name: to_upper_camel(&service.exposed_name),
            register_fn: format!("register_{}", to_snake(&service.exposed_name)),
        })
        .collect();
    MainExampleData {
        module_name: config.module_name.clone(),
        namespace: config.js_namespace.clone(),
        registrations,
    }
}

pub(super) fn build_build_script(config: &GeneratorConfig) -> BuildScriptData {
    BuildScriptData {
        module_name: config.module_name.clone(),
        wasm_export_path: config.wasm_export_path.clone(),
        ts_export_path: config.ts_export_path.clone(),
    }
}
