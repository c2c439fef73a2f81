//! Template data
//!
//! [`build_template_data`] turns one planned file plus the catalog into a plain
//! data object. Builders never touch output handles and never render text; every
//! list they produce is sorted or follows declaration order.

mod ts;
mod wasm;

pub use ts::{
    BundleData, ClientData, ClientMethodData, EnumData, EnumValueData, FactoryData,
    FactoryMessageData, FieldData, MessageData, PackageIndexData, TsImport, TypesData,
    model_name,
};
pub use wasm::{
    BuildScriptData, MainExampleData, MainRegistrationData, WasmMethodData, WasmServiceData, WasmWrapperData,
};

use crate::collector::ArtifactCatalog;
use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::naming::{to_lower_camel, to_snake};
use crate::planner::{file_types, FileSpec};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateData {
    WasmWrapper(WasmWrapperData),
    MainExample(MainExampleData),
    BuildScript(BuildScriptData),
    Client(ClientData),
    Types(TypesData),
    PackageIndex(PackageIndexData),
    Factory(FactoryData),
    Bundle(BundleData),
}

/// Build the data object for one planned file
pub fn build_template_data(
    spec: &FileSpec,
    catalog: &ArtifactCatalog<'_>,
    config: &GeneratorConfig,
) -> Result<TemplateData> {
    let data = match spec.file_type.as_str() {
        file_types::WASM_WRAPPER => TemplateData::WasmWrapper(wasm::build_wrapper(spec, catalog, config)?),
        file_types::MAIN_EXAMPLE => TemplateData::MainExample(wasm::build_main_example(catalog, config)),
        file_types::BUILD_SCRIPT => TemplateData::BuildScript(wasm::build_build_script(config)),
        file_types::SERVICE_CLIENT | file_types::BROWSER_SERVICE => {
            TemplateData::Client(ts::build_client(spec, catalog, config)?)
        }
        file_types::INTERFACES | file_types::MODELS | file_types::SCHEMAS => {
            TemplateData::Types(ts::build_types(spec, catalog)?)
        }
        file_types::PACKAGE_INDEX => {
            TemplateData::PackageIndex(ts::build_package_index(spec, catalog, config)?)
        }
        file_types::FACTORY => TemplateData::Factory(ts::build_factory(spec, catalog)?),
        file_types::BUNDLE => TemplateData::Bundle(ts::build_bundle(config)),
        other => {
            return Err(Error::UnknownFileType {
                name: spec.name.clone(),
                file_type: other.to_string(),
            })
        }
    };
    Ok(data)
}

/// Name under which the host exports a method and the client calls it
pub fn export_name(service_exposed: &str, method_exposed: &str) -> String {
    format!("{}_{}", to_lower_camel(service_exposed), method_exposed)
}

/// Rust function name of a host export
pub fn export_fn(service_exposed: &str, method_exposed: &str) -> String {
    format!("{}_{}", to_snake(service_exposed), to_snake(method_exposed))
}

fn require_meta<'s>(spec: &'s FileSpec, key: &str) -> Result<&'s str> {
    spec.meta_str(key).ok_or_else(|| Error::Render {
        name: spec.name.clone(),
        message: format!("missing metadata '{key}'"),
    })
}

fn missing_artifact(spec: &FileSpec, what: String) -> Error {
    Error::Render {
        name: spec.name.clone(),
        message: format!("{what} is not in the catalog"),
    }
}
