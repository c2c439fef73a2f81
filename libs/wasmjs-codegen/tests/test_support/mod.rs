#![allow(dead_code)]

use wasmjs_codegen::{collect_all_artifacts, ArtifactCatalog, FilterCriteria, GeneratorConfig};
use wasmjs_schema::{
    Annotations, EnumDef, FieldDef, FieldKind, GenerationRequest, MessageDef, MethodDef,
    ScalarType, SchemaFile, SchemaSet, ServiceDef,
};

pub const MODELS: &str = "library/v1/models/lib.schema";
pub const SERVICES: &str = "library/v1/services/lib.schema";
pub const COMMON: &str = "common/v1/money.schema";

pub fn string() -> FieldKind {
    FieldKind::Scalar(ScalarType::String)
}

pub fn request(files: Vec<SchemaFile>, generate: &[&str], parameter: Option<&str>) -> GenerationRequest {
    GenerationRequest {
        files_to_generate: generate.iter().map(|s| s.to_string()).collect(),
        parameter: parameter.map(str::to_string),
        schema_files: files,
        compiler_version: Some("test".to_string()),
    }
}

pub fn method(name: &str) -> MethodDef {
    MethodDef::new(
        name,
        format!(".library.v1.{name}Request"),
        format!(".library.v1.{name}Response"),
    )
}

/// Request and response messages for each method name
pub fn call_messages(names: &[&str]) -> Vec<MessageDef> {
    names
        .iter()
        .flat_map(|name| {
            [
                MessageDef::new(format!("{name}Request"))
                    .with_field(FieldDef::new("query", 1, string())),
                MessageDef::new(format!("{name}Response")).with_field(
                    FieldDef::new("books", 1, FieldKind::message(".library.v1.Book")).repeated(),
                ),
            ]
        })
        .collect()
}

pub fn common_file() -> SchemaFile {
    SchemaFile::new(COMMON, "common.v1").with_message(
        MessageDef::new("Money")
            .with_field(FieldDef::new("currency", 1, string()))
            .with_field(FieldDef::new("units", 2, FieldKind::Scalar(ScalarType::Int64))),
    )
}

/// `Book` with a nested enum, a map field and a cross-package reference
pub fn models_file() -> SchemaFile {
    SchemaFile::new(MODELS, "library.v1")
        .with_import(COMMON)
        .with_message(
            MessageDef::new("Book")
                .with_field(FieldDef::new("title", 1, string()))
                .with_field(FieldDef::new("tags", 2, string()).repeated())
                .with_field(FieldDef::new("price", 3, FieldKind::message(".common.v1.Money")))
                .with_field(FieldDef::new(
                    "format",
                    4,
                    FieldKind::enumeration(".library.v1.Book.Format"),
                ))
                .with_field(
                    FieldDef::new("labels", 5, FieldKind::message(".library.v1.Book.LabelsEntry"))
                        .repeated(),
                )
                .with_nested(MessageDef::map_entry("LabelsEntry", string(), string()))
                .with_nested_enum(
                    EnumDef::new("Format")
                        .with_value("FORMAT_UNSPECIFIED", 0)
                        .with_value("FORMAT_PAPERBACK", 1),
                ),
        )
        .with_enum(EnumDef::new("Status").with_value("STATUS_UNSPECIFIED", 0))
}

/// `LibraryService` plus `AdminService`, with request/response types
pub fn services_file() -> SchemaFile {
    let methods = ["FindBooks", "FindBooksInternal", "CreateBook", "GetBook"];
    let mut file = SchemaFile::new(SERVICES, "library.v1")
        .with_import(MODELS)
        .with_service(
            methods
                .iter()
                .fold(ServiceDef::new("LibraryService"), |s, m| s.with_method(method(m))),
        )
        .with_service(ServiceDef::new("AdminService").with_method(method("ResetCatalog")));
    for message in call_messages(&[
        "FindBooks",
        "FindBooksInternal",
        "CreateBook",
        "GetBook",
        "ResetCatalog",
    ]) {
        file = file.with_message(message);
    }
    file
}

pub fn library_files() -> Vec<SchemaFile> {
    vec![common_file(), models_file(), services_file()]
}

pub fn library_request(parameter: Option<&str>) -> GenerationRequest {
    request(library_files(), &[MODELS, SERVICES], parameter)
}

pub fn annotated(id: &str, value: serde_json::Value) -> Annotations {
    Annotations::new().with(id, value)
}

/// Parse config, build criteria and schema set the way the pipeline does
pub fn schema_and_config(request: &GenerationRequest) -> (SchemaSet, GeneratorConfig, FilterCriteria) {
    let config = match request.parameter.as_deref() {
        Some(p) => GeneratorConfig::from_parameter(p).unwrap(),
        None => GeneratorConfig::default(),
    };
    let criteria = FilterCriteria::from_config(&config).unwrap();
    let schema = SchemaSet::from_request(request).unwrap();
    (schema, config, criteria)
}

pub fn collect<'a>(
    schema: &'a SchemaSet,
    config: &GeneratorConfig,
    criteria: &FilterCriteria,
) -> ArtifactCatalog<'a> {
    collect_all_artifacts(schema, config, criteria).unwrap()
}
