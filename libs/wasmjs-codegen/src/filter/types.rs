//! Message and enum gathering, grouped by schema-file directory
//!
//! Groups are keyed by the directory of the declaring file rather than by package,
//! so two files of one package living in different folders never share a group.

use crate::analyzer::SchemaAnalyzer;
use crate::naming::nested_type_name;
use crate::paths::dir_of;
use std::collections::BTreeMap;
use wasmjs_schema::{EnumDef, MessageDef, SchemaFile};

/// A message selected for generation
#[derive(Debug, Clone)]
pub struct CollectedMessage<'a> {
    pub def: &'a MessageDef,
    /// Fully qualified name (".library.v1.Shelf.Slot")
    pub full_name: String,
    /// Generated identifier ("Shelf_Slot")
    pub type_name: String,
    pub file: &'a SchemaFile,
}

/// An enum selected for generation
#[derive(Debug, Clone)]
pub struct CollectedEnum<'a> {
    pub def: &'a EnumDef,
    pub full_name: String,
    pub type_name: String,
    pub file: &'a SchemaFile,
}

/// Gather messages (nested ones flattened) grouped by directory
///
/// Map entries and `exclude_type` messages are skipped; an excluded message takes its
/// nested declarations with it.
pub fn collect_messages<'a>(
    files: &[&'a SchemaFile],
    analyzer: &dyn SchemaAnalyzer,
) -> BTreeMap<String, Vec<CollectedMessage<'a>>> {
    let mut groups: BTreeMap<String, Vec<CollectedMessage<'a>>> = BTreeMap::new();
    for &file in files {
        let mut collected = Vec::new();
        for message in &file.messages {
            walk_messages(file, message, &mut Vec::new(), analyzer, &mut collected);
        }
        if !collected.is_empty() {
            groups
                .entry(dir_of(&file.path).to_string())
                .or_default()
                .extend(collected);
        }
    }
    groups
}

/// Gather enums (top-level and nested in messages) grouped by directory
pub fn collect_enums<'a>(
    files: &[&'a SchemaFile],
    analyzer: &dyn SchemaAnalyzer,
) -> BTreeMap<String, Vec<CollectedEnum<'a>>> {
    let mut groups: BTreeMap<String, Vec<CollectedEnum<'a>>> = BTreeMap::new();
    for &file in files {
        let mut collected = Vec::new();
        for enum_def in &file.enums {
            push_enum(file, enum_def, &[], analyzer, &mut collected);
        }
        for message in &file.messages {
            walk_nested_enums(file, message, &mut Vec::new(), analyzer, &mut collected);
        }
        if !collected.is_empty() {
            groups
                .entry(dir_of(&file.path).to_string())
                .or_default()
                .extend(collected);
        }
    }
    groups
}

fn walk_messages<'a>(
    file: &'a SchemaFile,
    message: &'a MessageDef,
    scope: &mut Vec<&'a str>,
    analyzer: &dyn SchemaAnalyzer,
    out: &mut Vec<CollectedMessage<'a>>,
) {
    if analyzer.is_map_entry(message) {
        tracing::trace!(message = %message.name, file = %file.path, "Skipping map entry");
        return;
    }
    if analyzer.is_message_excluded(message) {
        tracing::debug!(message = %message.name, file = %file.path, "Message excluded by annotation");
        return;
    }

    scope.push(&message.name);
    out.push(CollectedMessage {
        def: message,
        full_name: qualified(file, scope),
        type_name: nested_type_name(scope),
        file,
    });
    for nested in &message.nested_messages {
        walk_messages(file, nested, scope, analyzer, out);
    }
    scope.pop();
}

fn walk_nested_enums<'a>(
    file: &'a SchemaFile,
    message: &'a MessageDef,
    scope: &mut Vec<&'a str>,
    analyzer: &dyn SchemaAnalyzer,
    out: &mut Vec<CollectedEnum<'a>>,
) {
    if analyzer.is_map_entry(message) || analyzer.is_message_excluded(message) {
        return;
    }

    scope.push(&message.name);
    for enum_def in &message.nested_enums {
        push_enum(file, enum_def, scope, analyzer, out);
    }
    for nested in &message.nested_messages {
        walk_nested_enums(file, nested, scope, analyzer, out);
    }
    scope.pop();
}

fn push_enum<'a>(
    file: &'a SchemaFile,
    enum_def: &'a EnumDef,
    scope: &[&'a str],
    analyzer: &dyn SchemaAnalyzer,
    out: &mut Vec<CollectedEnum<'a>>,
) {
    if analyzer.is_enum_excluded(enum_def) {
        tracing::debug!(enum_name = %enum_def.name, file = %file.path, "Enum excluded by annotation");
        return;
    }
    let mut path = scope.to_vec();
    path.push(&enum_def.name);
    out.push(CollectedEnum {
        def: enum_def,
        full_name: qualified(file, &path),
        type_name: nested_type_name(&path),
        file,
    });
}

fn qualified(file: &SchemaFile, path: &[&str]) -> String {
    format!("{}.{}", file.scope(), path.join("."))
}
