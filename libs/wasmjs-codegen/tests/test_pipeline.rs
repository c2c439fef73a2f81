//! Full `generate` runs over in-memory requests

use serde_json::json;
use wasmjs_codegen::analyzer::TS_FACTORY;
use wasmjs_codegen::{generate, plan, Error};
use wasmjs_schema::{FieldDef, GenerationResponse, MessageDef, SchemaFile};

mod test_support;
use test_support::*;

fn names(response: &GenerationResponse) -> Vec<&str> {
    response.files.iter().map(|f| f.name.as_str()).collect()
}

fn content<'r>(response: &'r GenerationResponse, name: &str) -> &'r str {
    response
        .files
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.content.as_str())
        .unwrap_or_else(|| panic!("{name} not generated"))
}

#[test]
fn generates_host_and_client_files() {
    let response = generate(&library_request(None)).unwrap();
    assert_eq!(
        names(&response),
        vec![
            "build.sh",
            "library/v1/services/library_v1_wasm.rs",
            "main.rs.example",
            "library/v1/admin_service_client.ts",
            "library/v1/library_service_client.ts",
            "library/v1/models/interfaces.ts",
            "library/v1/models/models.ts",
            "library/v1/models/schemas.ts",
            "library/v1/services/interfaces.ts",
            "library/v1/services/models.ts",
            "library/v1/services/schemas.ts",
            "library_v1.ts",
            "wasm_services_bundle.ts",
        ]
    );

    let wrapper = content(&response, "library/v1/services/library_v1_wasm.rs");
    assert!(wrapper.contains("pub trait LibraryService"));
    assert!(wrapper.contains("pub trait AdminService"));
    assert!(wrapper.contains("#[wasm_bindgen(js_name = \"libraryService_findBooks\")]"));

    let client = content(&response, "library/v1/library_service_client.ts");
    assert!(client.contains("export class LibraryServiceClient {"));
    assert!(client.contains("findBooks(request: FindBooksRequest): FindBooksResponse {"));
    assert!(client.contains("from \"../../wasm_services_bundle\""));
    assert!(client.contains("export const libraryService = new LibraryServiceClient();"));

    let barrel = content(&response, "library_v1.ts");
    assert!(barrel.contains("export * from \"./library/v1/models/interfaces\";"));
    assert!(barrel.contains("export * from \"./library/v1/services/schemas\";"));

    let models = content(&response, "library/v1/models/models.ts");
    assert!(models.contains("export class BookModel implements Book {"));
    assert!(models.contains("labels: Record<string, string> = {};"));
}

#[test]
fn every_file_carries_the_generated_header() {
    let response = generate(&library_request(None)).unwrap();
    for file in &response.files {
        assert!(
            file.content.contains("Code generated by wasmjs-gen. DO NOT EDIT."),
            "{} lacks header",
            file.name
        );
    }
}

#[test]
fn nothing_to_emit_is_an_empty_response() {
    let req = request(library_files(), &[], None);
    let response = generate(&req).unwrap();
    assert!(response.files.is_empty());
    assert!(plan(&req).unwrap().is_empty());

    // a file with no services, messages or enums
    let bare = SchemaFile::new("bare/bare.schema", "bare");
    let response = generate(&request(vec![bare], &["bare/bare.schema"], None)).unwrap();
    assert!(response.files.is_empty());
}

#[test]
fn malformed_options_fail_before_collection() {
    let err = generate(&library_request(Some("method_rename=FindBooks"))).unwrap_err();
    assert!(matches!(err, Error::InvalidRename { .. }));

    let err = generate(&library_request(Some("js_structure=nested"))).unwrap_err();
    assert!(matches!(err, Error::UnknownStructure(s) if s == "nested"));

    let err = generate(&library_request(Some("colour=blue"))).unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let err = generate(&library_request(Some("generate_ts=maybe"))).unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let err = generate(&library_request(Some("module_name=9lives"))).unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    for parameter in ["ts_export_path=../../etc", "wasm_export_path=/abs/out"] {
        let err = generate(&library_request(Some(parameter))).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{parameter}: {err}");
    }
}

#[test]
fn glob_metacharacters_match_literally() {
    let response = generate(&library_request(Some("method_include=[FindBooks]"))).unwrap();
    let client = content(&response, "library/v1/library_service_client.ts");
    assert!(!client.contains("findBooks("));
    assert!(!client.contains("getBook("));
}

#[test]
fn schema_errors_surface_unchanged() {
    let req = request(library_files(), &["missing.schema"], None);
    let err = generate(&req).unwrap_err();
    assert!(matches!(err, Error::Schema(_)));
}

#[test]
fn disabling_targets() {
    let response = generate(&library_request(Some("generate_ts=false"))).unwrap();
    assert!(names(&response).iter().all(|n| !n.ends_with(".ts")));
    assert!(names(&response).contains(&"library/v1/services/library_v1_wasm.rs"));

    let response = generate(&library_request(Some(
        "generate_wasm=false,generate_schemas=false",
    )))
    .unwrap();
    assert!(names(&response).iter().all(|n| n.ends_with(".ts")));
    assert!(names(&response).iter().all(|n| !n.ends_with("schemas.ts")));
    assert!(!content(&response, "library_v1.ts").contains("schemas"));

    let response = generate(&library_request(Some("generate_types=false"))).unwrap();
    assert_eq!(
        names(&response)
            .into_iter()
            .filter(|n| n.ends_with(".ts"))
            .collect::<Vec<_>>(),
        vec![
            "library/v1/admin_service_client.ts",
            "library/v1/library_service_client.ts",
            "wasm_services_bundle.ts",
        ]
    );

    let response = generate(&library_request(Some("generate_build_script=false"))).unwrap();
    assert!(!names(&response).contains(&"build.sh"));
}

#[test]
fn client_layouts() {
    let flat = generate(&library_request(Some("js_structure=flat"))).unwrap();
    let client = content(&flat, "library_service_client.ts");
    assert!(client.contains("from \"./library_v1\""));
    assert!(client.contains("from \"./wasm_services_bundle\""));

    let by_service = generate(&library_request(Some("js_structure=service_based"))).unwrap();
    let client = content(&by_service, "library_service/client.ts");
    assert!(client.contains("from \"../library_v1\""));
    assert!(client.contains("from \"../wasm_services_bundle\""));
}

#[test]
fn export_paths_prefix_outputs() {
    let response = generate(&library_request(Some(
        "wasm_export_path=rust/src,ts_export_path=web/gen,module_name=library_api",
    )))
    .unwrap();
    let all = names(&response);
    assert!(all.contains(&"rust/src/library/v1/services/library_v1_wasm.rs"));
    assert!(all.contains(&"rust/src/build.sh"));
    assert!(all.contains(&"web/gen/library_api_bundle.ts"));
    assert!(all.contains(&"web/gen/library/v1/library_service_client.ts"));

    let bundle = content(&response, "web/gen/library_api_bundle.ts");
    assert!(bundle.contains("export const MODULE_NAME = \"library_api\";"));
    assert!(bundle.contains("export const NAMESPACE = \"libraryApi\";"));
}

#[test]
fn factory_follows_same_package_imports_only() {
    let mut files = library_files();
    files[2] = services_file().with_annotations(annotated(TS_FACTORY, json!(true)));
    let response = generate(&request(files, &[MODELS, SERVICES], None)).unwrap();

    let factory = content(&response, "library/v1/services/lib_factory.ts");
    assert!(factory.contains("export class LibFactory {"));
    assert!(factory.contains("import { BookModel } from \"../models/models\";"));
    assert!(factory.contains("createBook(init?: Partial<BookModel>): BookModel {"));
    assert!(factory.contains("case \".library.v1.FindBooksRequest\":"));
    assert!(!factory.contains("Money"));
}

#[test]
fn factory_only_file_still_generates() {
    const FACTORY: &str = "library/v1/factory/all.schema";
    let marker = SchemaFile::new(FACTORY, "library.v1")
        .with_import(MODELS)
        .with_annotations(annotated(TS_FACTORY, json!(true)));
    let mut files = library_files();
    files.push(marker);

    let response = generate(&request(files, &[FACTORY], None)).unwrap();
    assert_eq!(
        names(&response),
        vec!["library/v1/factory/all_factory.ts", "wasm_services_bundle.ts"]
    );

    let factory = content(&response, "library/v1/factory/all_factory.ts");
    assert!(factory.contains("export class AllFactory {"));
    assert!(factory.contains("import { BookModel } from \"../models/models\";"));
}

#[test]
fn same_directory_different_packages_conflict() {
    let alpha = SchemaFile::new("shared/alpha.schema", "alpha")
        .with_message(MessageDef::new("A").with_field(FieldDef::new("id", 1, string())));
    let beta = SchemaFile::new("shared/beta.schema", "beta")
        .with_message(MessageDef::new("B").with_field(FieldDef::new("id", 1, string())));
    let req = request(
        vec![alpha, beta],
        &["shared/alpha.schema", "shared/beta.schema"],
        None,
    );

    let err = generate(&req).unwrap_err();
    match err {
        Error::DuplicatePath { path, first, second } => {
            assert_eq!(path, "shared/interfaces.ts");
            assert_eq!(first, "ts:interfaces:alpha@shared");
            assert_eq!(second, "ts:interfaces:beta@shared");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unresolved_method_types_abort_generation() {
    let broken = SchemaFile::new("a/a.schema", "a").with_service(
        wasmjs_schema::ServiceDef::new("Broken").with_method(method("Call")),
    );
    let err = generate(&request(vec![broken], &["a/a.schema"], None)).unwrap_err();
    assert!(matches!(err, Error::Collection { .. }));
    assert!(err.to_string().contains(".library.v1.CallRequest"));
}
