use super::{export_name, missing_artifact, require_meta};
use crate::collector::{ArtifactCatalog, TypeEntry, TypeIndex};
use crate::config::{GeneratorConfig, OutputStructure};
use crate::error::Result;
use crate::naming::{file_stem, json_name, to_upper_camel};
use crate::paths::{cross_package_import, dir_of, import_from_dir, join, relative_import};
use crate::planner::{
    bundle_path, client_path, file_types, meta, package_index_path, package_module,
    type_file_path, FileSpec,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use wasmjs_schema::{EnumDef, FieldDef, FieldKind, MessageDef, ScalarType};

/// One import statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TsImport {
    pub from: String,
    pub names: Vec<String>,
    pub type_only: bool,
}

#[derive(Debug, Default)]
struct ImportSet(BTreeMap<(String, bool), BTreeSet<String>>);

impl ImportSet {
    fn add(&mut self, from: String, name: &str, type_only: bool) {
        self.0.entry((from, type_only)).or_default().insert(name.to_string());
    }

    fn into_vec(self) -> Vec<TsImport> {
        self.0
            .into_iter()
            .map(|((from, type_only), names)| TsImport {
                from,
                names: names.into_iter().collect(),
                type_only,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientData {
    pub package: String,
    pub service_name: String,
    pub exposed_name: String,
    pub full_name: String,
    pub namespace: String,
    pub is_browser: bool,
    pub comment: Option<String>,
    pub methods: Vec<ClientMethodData>,
    pub imports: Vec<TsImport>,
    pub bundle_import: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientMethodData {
    pub name: String,
    pub exposed_name: String,
    pub export_name: String,
    /// Request and response identifiers keep their declared names under renames
    pub request_type: String,
    pub response_type: String,
    pub is_async: bool,
    pub timeout_ms: Option<u32>,
    pub server_streaming: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypesData {
    pub package: String,
    pub directory: String,
    pub file_type: String,
    pub messages: Vec<MessageData>,
    pub enums: Vec<EnumData>,
    pub imports: Vec<TsImport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageData {
    pub name: String,
    pub full_name: String,
    pub comment: Option<String>,
    pub fields: Vec<FieldData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldData {
    /// JSON name
    pub name: String,
    pub proto_name: String,
    pub number: i32,
    /// "scalar", "message", "enum" or "map"
    pub kind: &'static str,
    pub scalar: Option<&'static str>,
    pub ts_type: String,
    pub repeated: bool,
    pub optional: bool,
    /// Initializer for concrete models; `None` leaves the field unset
    pub default_value: Option<String>,
    /// Fully qualified name of a referenced message or enum
    pub type_ref: Option<String>,
    pub oneof_index: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumData {
    pub name: String,
    pub full_name: String,
    pub comment: Option<String>,
    pub values: Vec<EnumValueData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValueData {
    pub name: String,
    pub number: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageIndexData {
    pub package: String,
    /// Module specifiers re-exported by the barrel
    pub exports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactoryData {
    pub source_file: String,
    pub package: String,
    pub factory_name: String,
    pub messages: Vec<FactoryMessageData>,
    pub imports: Vec<TsImport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactoryMessageData {
    pub type_name: String,
    pub full_name: String,
    pub model_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleData {
    pub module_name: String,
    pub namespace: String,
    pub structure: String,
}

/// Name of the concrete class generated for a message
pub fn model_name(type_name: &str) -> String {
    format!("{type_name}Model")
}

pub(super) fn build_client(
    spec: &FileSpec,
    catalog: &ArtifactCatalog<'_>,
    config: &GeneratorConfig,
) -> Result<ClientData> {
    let package = require_meta(spec, meta::PACKAGE)?;
    let name = require_meta(spec, meta::SERVICE)?;
    let service = catalog
        .find_service(package, name)
        .ok_or_else(|| missing_artifact(spec, format!("service {package}.{name}")))?;

    let own_path = client_path(package, name, config.structure);
    let mut imports = ImportSet::default();
    let mut methods = Vec::with_capacity(service.methods.len());

    for artifact in &service.methods {
        let method = artifact.method;
        let mut reference = |full_name: &str| -> Result<String> {
            let entry = catalog
                .types
                .message(full_name)
                .ok_or_else(|| missing_artifact(spec, format!("type {full_name}")))?;
            if !entry.is_generated() {
                return Ok("unknown".to_string());
            }
            let from = barrel_import(&own_path, package, &entry.package, config);
            imports.add(from, &entry.type_name, true);
            Ok(entry.type_name.clone())
        };

        let request_type = reference(&method.input_type)?;
        let response_type = reference(&method.output_type)?;
        methods.push(ClientMethodData {
            name: method.name.clone(),
            exposed_name: artifact.exposed_name.clone(),
            export_name: export_name(&service.exposed_name, &artifact.exposed_name),
            request_type,
            response_type,
            is_async: artifact.is_async,
            timeout_ms: artifact.timeout_ms,
            server_streaming: method.server_streaming,
            comment: method.comment.clone(),
        });
    }

    Ok(ClientData {
        package: package.to_string(),
        service_name: service.name().to_string(),
        exposed_name: service.exposed_name.clone(),
        full_name: service.full_name(),
        namespace: config.js_namespace.clone(),
        is_browser: service.is_browser,
        comment: service.service.comment.clone(),
        methods,
        imports: imports.into_vec(),
        bundle_import: relative_import(&own_path, &bundle_path(config)),
    })
}

/// Module specifier of a package barrel as seen from a client file
fn barrel_import(from_file: &str, from_package: &str, to_package: &str, config: &GeneratorConfig) -> String {
    if config.structure == OutputStructure::Namespaced && !to_package.is_empty() {
        cross_package_import(from_package, to_package)
    } else {
        import_from_dir(dir_of(from_file), &package_module(to_package, config))
    }
}

pub(super) fn build_types(spec: &FileSpec, catalog: &ArtifactCatalog<'_>) -> Result<TypesData> {
    let package = require_meta(spec, meta::PACKAGE)?;
    let directory = require_meta(spec, meta::DIRECTORY)?;
    let messages = catalog.message_group(package, directory);
    let enums = catalog.enum_group(package, directory);
    if messages.is_none() && enums.is_none() {
        return Err(missing_artifact(spec, format!("type group {package}@{directory}")));
    }

    let own_path = type_file_path(directory, &spec.file_type);
    let mut ctx = FieldContext {
        types: &catalog.types,
        package,
        directory,
        own_path: &own_path,
        imports: ImportSet::default(),
        import_local: spec.file_type == file_types::MODELS,
    };

    let mut message_data = Vec::new();
    for message in messages.into_iter().flat_map(|g| g.messages.iter()) {
        if ctx.import_local {
            let from = relative_import(&own_path, &type_file_path(directory, file_types::INTERFACES));
            ctx.imports.add(from, &message.type_name, true);
        }
        message_data.push(MessageData {
            name: message.type_name.clone(),
            full_name: message.full_name.clone(),
            comment: message.def.comment.clone(),
            fields: message_fields(message.def, &mut ctx),
        });
    }

    let enum_data = enums
        .into_iter()
        .flat_map(|g| g.enums.iter())
        .map(|e| enum_data(&e.type_name, &e.full_name, e.def))
        .collect();

    let imports = if spec.file_type == file_types::SCHEMAS {
        Vec::new()
    } else {
        ctx.imports.into_vec()
    };

    Ok(TypesData {
        package: package.to_string(),
        directory: directory.to_string(),
        file_type: spec.file_type.clone(),
        messages: message_data,
        enums: enum_data,
        imports,
    })
}

struct FieldContext<'c> {
    types: &'c TypeIndex,
    package: &'c str,
    directory: &'c str,
    own_path: &'c str,
    imports: ImportSet,
    /// Also import same-directory types from the interfaces file
    import_local: bool,
}

impl FieldContext<'_> {
    fn named(&mut self, entry: &TypeEntry) -> String {
        if !entry.is_generated() {
            return "unknown".to_string();
        }
        let local = entry.package == self.package && entry.directory == self.directory;
        if !local || self.import_local {
            let target = type_file_path(&entry.directory, file_types::INTERFACES);
            self.imports
                .add(relative_import(self.own_path, &target), &entry.type_name, true);
        }
        entry.type_name.clone()
    }

    fn lookup(&self, full_name: &str) -> Option<&TypeEntry> {
        self.types.get(full_name)
    }
}

fn message_fields(message: &MessageDef, ctx: &mut FieldContext<'_>) -> Vec<FieldData> {
    message.fields.iter().map(|f| field_data(f, ctx)).collect()
}

fn field_data(field: &FieldDef, ctx: &mut FieldContext<'_>) -> FieldData {
    let repeated = field.is_repeated();
    let mut data = FieldData {
        name: field.json_name.clone().unwrap_or_else(|| json_name(&field.name)),
        proto_name: field.name.clone(),
        number: field.number,
        kind: "scalar",
        scalar: None,
        ts_type: String::new(),
        repeated,
        optional: field.proto3_optional || field.oneof_index.is_some(),
        default_value: None,
        type_ref: field.kind.type_name().map(str::to_string),
        oneof_index: field.oneof_index,
    };

    let (element, default) = match &field.kind {
        FieldKind::Scalar(scalar) => {
            data.scalar = Some(scalar_name(*scalar));
            (scalar_ts(*scalar).to_string(), Some(scalar_default(*scalar).to_string()))
        }
        FieldKind::Enum(full_name) => {
            data.kind = "enum";
            match ctx.lookup(full_name).cloned() {
                Some(entry) => (ctx.named(&entry), Some("0".to_string())),
                None => ("unknown".to_string(), None),
            }
        }
        FieldKind::Message(full_name) => {
            let entry = ctx.lookup(full_name).cloned();
            match entry {
                Some(TypeEntry {
                    map_entry: Some(map), ..
                }) => {
                    data.kind = "map";
                    data.repeated = false;
                    data.type_ref = map.value.type_name().map(str::to_string);
                    let value = value_ts(&map.value, ctx);
                    data.ts_type = format!("Record<string, {value}>");
                    data.default_value = Some("{}".to_string());
                    return data;
                }
                Some(entry) => {
                    data.kind = "message";
                    data.optional = data.optional || !repeated;
                    (ctx.named(&entry), None)
                }
                None => {
                    data.kind = "message";
                    ("unknown".to_string(), None)
                }
            }
        }
    };

    if repeated {
        data.ts_type = format!("{element}[]");
        data.default_value = Some("[]".to_string());
    } else {
        data.ts_type = element;
        if !data.optional {
            data.default_value = default;
        }
    }
    data
}

fn value_ts(kind: &FieldKind, ctx: &mut FieldContext<'_>) -> String {
    match kind {
        FieldKind::Scalar(scalar) => scalar_ts(*scalar).to_string(),
        FieldKind::Message(name) | FieldKind::Enum(name) => match ctx.lookup(name).cloned() {
            Some(entry) => ctx.named(&entry),
            None => "unknown".to_string(),
        },
    }
}

fn scalar_ts(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Bool => "boolean",
        ScalarType::String | ScalarType::Bytes => "string",
        s if s.is_64_bit() => "string",
        _ => "number",
    }
}

fn scalar_default(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Bool => "false",
        ScalarType::String | ScalarType::Bytes => "\"\"",
        s if s.is_64_bit() => "\"0\"",
        _ => "0",
    }
}

fn scalar_name(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Double => "double",
        ScalarType::Float => "float",
        ScalarType::Int32 => "int32",
        ScalarType::Int64 => "int64",
        ScalarType::Uint32 => "uint32",
        ScalarType::Uint64 => "uint64",
        ScalarType::Sint32 => "sint32",
        ScalarType::Sint64 => "sint64",
        ScalarType::Fixed32 => "fixed32",
        ScalarType::Fixed64 => "fixed64",
        ScalarType::Sfixed32 => "sfixed32",
        ScalarType::Sfixed64 => "sfixed64",
        ScalarType::Bool => "bool",
        ScalarType::String => "string",
        ScalarType::Bytes => "bytes",
    }
}

fn enum_data(type_name: &str, full_name: &str, def: &EnumDef) -> EnumData {
    EnumData {
        name: type_name.to_string(),
        full_name: full_name.to_string(),
        comment: def.comment.clone(),
        values: def
            .values
            .iter()
            .map(|v| EnumValueData {
                name: v.name.clone(),
                number: v.number,
            })
            .collect(),
    }
}

pub(super) fn build_package_index(
    spec: &FileSpec,
    catalog: &ArtifactCatalog<'_>,
    config: &GeneratorConfig,
) -> Result<PackageIndexData> {
    let package = require_meta(spec, meta::PACKAGE)?;
    let info = catalog
        .package(package)
        .ok_or_else(|| missing_artifact(spec, format!("package {package}")))?;

    let own_path = package_index_path(package, config);
    let mut kinds = vec![file_types::INTERFACES, file_types::MODELS];
    if config.generate_schemas {
        kinds.push(file_types::SCHEMAS);
    }

    let mut exports = Vec::new();
    for directory in &info.type_directories {
        for kind in &kinds {
            exports.push(relative_import(&own_path, &type_file_path(directory, kind)));
        }
    }
    Ok(PackageIndexData {
        package: package.to_string(),
        exports,
    })
}

pub(super) fn build_factory(spec: &FileSpec, catalog: &ArtifactCatalog<'_>) -> Result<FactoryData> {
    let source = require_meta(spec, meta::SOURCE_FILE)?;
    let factory = catalog
        .factories
        .iter()
        .find(|f| f.file.path == source)
        .ok_or_else(|| missing_artifact(spec, format!("factory for {source}")))?;

    let stem = file_stem(source);
    let own_path = join(&[&factory.directory, &format!("{stem}_factory.ts")]);
    let mut imports = ImportSet::default();
    let mut messages = Vec::with_capacity(factory.messages.len());
    for message in &factory.messages {
        let model = model_name(&message.type_name);
        let target = type_file_path(dir_of(&message.file.path), file_types::MODELS);
        imports.add(relative_import(&own_path, &target), &model, false);
        messages.push(FactoryMessageData {
            type_name: message.type_name.clone(),
            full_name: message.full_name.clone(),
            model_name: model,
        });
    }

    Ok(FactoryData {
        source_file: source.to_string(),
        package: factory.package.clone(),
        factory_name: format!("{}Factory", to_upper_camel(stem)),
        messages,
        imports: imports.into_vec(),
    })
}

pub(super) fn build_bundle(config: &GeneratorConfig) -> BundleData {
    BundleData {
        module_name: config.module_name.clone(),
        namespace: config.js_namespace.clone(),
        structure: config.structure.to_string(),
    }
}
