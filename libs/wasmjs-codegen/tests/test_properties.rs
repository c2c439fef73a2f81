//! Whole-invocation properties: determinism, path uniqueness, grouping

use std::collections::{BTreeMap, HashSet};
use wasmjs_codegen::paths::dir_of;
use wasmjs_codegen::{generate, plan};
use wasmjs_schema::{GenerationResponse, SchemaFile, ServiceDef};

mod test_support;
use test_support::*;

fn bundle(response: &GenerationResponse) -> &str {
    response
        .files
        .iter()
        .find(|f| f.name == "wasm_services_bundle.ts")
        .map(|f| f.content.as_str())
        .unwrap()
}

#[test]
fn identical_requests_produce_identical_output() {
    let req = library_request(None);
    let first = generate(&req).unwrap();
    let second = generate(&req).unwrap();
    assert_eq!(first, second);
    assert!(!first.files.is_empty());
}

#[test]
fn input_file_order_does_not_change_output() {
    let forward = library_request(Some("module_name=library_api"));
    let mut reversed = forward.clone();
    reversed.schema_files.reverse();
    reversed.files_to_generate.reverse();

    assert_eq!(generate(&forward).unwrap(), generate(&reversed).unwrap());
}

#[test]
fn output_paths_are_unique_across_targets() {
    for parameter in [None, Some("js_structure=flat"), Some("js_structure=service_based")] {
        let response = generate(&library_request(parameter)).unwrap();
        let mut seen = HashSet::new();
        for file in &response.files {
            assert!(seen.insert(file.name.as_str()), "duplicate {}", file.name);
        }
    }
}

#[test]
fn every_planned_file_is_written() {
    let req = library_request(None);
    let planned: Vec<String> = plan(&req)
        .unwrap()
        .iter()
        .flat_map(|p| p.paths())
        .map(str::to_string)
        .collect();
    let written: Vec<String> = generate(&req)
        .unwrap()
        .files
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(planned, written);
}

#[test]
fn message_groups_partition_emitted_messages_by_directory() {
    let req = library_request(None);
    let (schema, config, criteria) = schema_and_config(&req);
    let catalog = collect(&schema, &config, &criteria);

    let mut owner: BTreeMap<&str, (&str, &str)> = BTreeMap::new();
    for group in &catalog.messages {
        for message in &group.messages {
            assert_eq!(dir_of(&message.file.path), group.directory);
            assert_eq!(message.file.package, group.package);
            let previous = owner.insert(
                message.full_name.as_str(),
                (group.package.as_str(), group.directory.as_str()),
            );
            assert!(previous.is_none(), "{} in two groups", message.full_name);
        }
    }

    // Book and the ten request/response messages; map entries and the
    // visible-but-not-emitted common package are not grouped
    assert_eq!(owner.len(), 11);
    assert!(owner.contains_key(".library.v1.Book"));
    assert!(!owner.contains_key(".library.v1.Book.LabelsEntry"));
    assert!(!owner.contains_key(".common.v1.Money"));
}

#[test]
fn overlapping_invocations_write_the_same_bundle() {
    let models_only = request(library_files(), &[MODELS], None);
    let services_only = request(library_files(), &[SERVICES], None);

    let a = generate(&models_only).unwrap();
    let b = generate(&services_only).unwrap();
    assert_eq!(bundle(&a), bundle(&b));

    // package barrels are rebuilt from the visible registry, not the emitted subset
    let barrel = |r: &GenerationResponse| {
        r.files
            .iter()
            .find(|f| f.name == "library_v1.ts")
            .map(|f| f.content.clone())
    };
    assert_eq!(barrel(&a), barrel(&b));
}

#[test]
fn unrelated_options_do_not_move_files() {
    let base = plan(&library_request(None)).unwrap();
    let renamed = plan(&library_request(Some("method_rename=FindBooks:searchBooks"))).unwrap();
    let paths = |plans: &[wasmjs_codegen::FilePlan]| -> Vec<String> {
        plans
            .iter()
            .flat_map(|p| p.paths())
            .map(str::to_string)
            .collect()
    };
    assert_eq!(paths(&base), paths(&renamed));
}

#[test]
fn directories_of_one_package_get_their_own_wrapper() {
    let service_file = |path: &str, service: &str, call: &str| {
        call_messages(&[call]).into_iter().fold(
            SchemaFile::new(path, "library.v1")
                .with_service(ServiceDef::new(service).with_method(method(call))),
            |file, message| file.with_message(message),
        )
    };
    let files = vec![
        common_file(),
        models_file(),
        service_file("library/v1/a/x.schema", "AService", "Alpha"),
        service_file("library/v1/b/x.schema", "BService", "Beta"),
    ];

    let wrapper = |generate_path: &str| {
        let response = generate(&request(files.clone(), &[generate_path], None)).unwrap();
        response
            .files
            .into_iter()
            .find(|f| f.name.ends_with("_wasm.rs"))
            .unwrap()
    };
    let a = wrapper("library/v1/a/x.schema");
    let b = wrapper("library/v1/b/x.schema");

    assert_eq!(a.name, "library/v1/a/library_v1_wasm.rs");
    assert_eq!(b.name, "library/v1/b/library_v1_wasm.rs");
    assert!(a.content.contains("pub trait AService"));
    assert!(!a.content.contains("BService"));
    assert!(b.content.contains("pub trait BService"));
}
