//! Invocation-wide index of every declared type
//!
//! Built from all visible files, emit flag ignored, so planners can resolve a
//! reference into a package that this invocation does not emit.

use crate::analyzer::SchemaAnalyzer;
use crate::error::{Error, Result};
use crate::naming::nested_type_name;
use crate::paths::dir_of;
use serde::Serialize;
use std::collections::BTreeMap;
use wasmjs_schema::{EnumDef, FieldKind, MessageDef, SchemaFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Message,
    Enum,
}

/// Key and value kinds of a synthetic map-entry message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapEntryTypes {
    pub key: FieldKind,
    pub value: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeEntry {
    pub full_name: String,
    pub package: String,
    /// Directory of the declaring schema file
    pub directory: String,
    pub file: String,
    /// Generated identifier ("Shelf_Slot")
    pub type_name: String,
    pub kind: TypeKind,
    pub map_entry: Option<MapEntryTypes>,
    /// Dropped by an `exclude_type` annotation (directly or through its parent)
    pub excluded: bool,
}

impl TypeEntry {
    /// Whether the type shows up in generated type files
    pub fn is_generated(&self) -> bool {
        self.map_entry.is_none() && !self.excluded
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    entries: BTreeMap<String, TypeEntry>,
    /// (package, generated identifier) -> full name, generated types only
    identifiers: BTreeMap<(String, String), String>,
}

impl TypeIndex {
    pub fn build<'a>(
        files: impl IntoIterator<Item = &'a SchemaFile>,
        analyzer: &dyn SchemaAnalyzer,
    ) -> Result<Self> {
        let mut index = Self::default();
        for file in files {
            for message in &file.messages {
                index.add_message(file, message, &mut Vec::new(), false, analyzer)?;
            }
            for enum_def in &file.enums {
                index.add_enum(file, enum_def, &[], false, analyzer)?;
            }
        }
        Ok(index)
    }

    pub fn get(&self, full_name: &str) -> Option<&TypeEntry> {
        self.entries.get(full_name)
    }

    /// Message entry for a fully qualified name
    pub fn message(&self, full_name: &str) -> Option<&TypeEntry> {
        self.get(full_name).filter(|e| e.kind == TypeKind::Message)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn add_message(
        &mut self,
        file: &SchemaFile,
        message: &MessageDef,
        scope: &mut Vec<String>,
        parent_excluded: bool,
        analyzer: &dyn SchemaAnalyzer,
    ) -> Result<()> {
        let excluded = parent_excluded || analyzer.is_message_excluded(message);
        scope.push(message.name.clone());

        let map_entry = if analyzer.is_map_entry(message) {
            map_entry_types(file, message)?
        } else {
            None
        };
        self.insert(file, scope, TypeKind::Message, map_entry, excluded)?;

        for nested in &message.nested_messages {
            self.add_message(file, nested, scope, excluded, analyzer)?;
        }
        for enum_def in &message.nested_enums {
            self.add_enum(file, enum_def, scope, excluded, analyzer)?;
        }
        scope.pop();
        Ok(())
    }

    fn add_enum(
        &mut self,
        file: &SchemaFile,
        enum_def: &EnumDef,
        scope: &[String],
        parent_excluded: bool,
        analyzer: &dyn SchemaAnalyzer,
    ) -> Result<()> {
        let excluded = parent_excluded || analyzer.is_enum_excluded(enum_def);
        let mut path = scope.to_vec();
        path.push(enum_def.name.clone());
        self.insert(file, &path, TypeKind::Enum, None, excluded)
    }

    fn insert(
        &mut self,
        file: &SchemaFile,
        path: &[String],
        kind: TypeKind,
        map_entry: Option<MapEntryTypes>,
        excluded: bool,
    ) -> Result<()> {
        let full_name = format!("{}.{}", file.scope(), path.join("."));
        if let Some(existing) = self.entries.get(&full_name) {
            return Err(Error::Collection {
                package: file.package.clone(),
                file: file.path.clone(),
                message: format!("type {full_name} is also declared in {}", existing.file),
            });
        }

        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        let entry = TypeEntry {
            full_name: full_name.clone(),
            package: file.package.clone(),
            directory: dir_of(&file.path).to_string(),
            file: file.path.clone(),
            type_name: nested_type_name(&segments),
            kind,
            map_entry,
            excluded,
        };

        if entry.is_generated() {
            let key = (entry.package.clone(), entry.type_name.clone());
            if let Some(other) = self.identifiers.insert(key, full_name.clone()) {
                return Err(Error::Collection {
                    package: file.package.clone(),
                    file: file.path.clone(),
                    message: format!(
                        "types {other} and {full_name} both generate as {}",
                        entry.type_name
                    ),
                });
            }
        }

        self.entries.insert(full_name, entry);
        Ok(())
    }
}

fn map_entry_types(file: &SchemaFile, message: &MessageDef) -> Result<Option<MapEntryTypes>> {
    let field = |name: &str| message.fields.iter().find(|f| f.name == name);
    match (field("key"), field("value")) {
        (Some(key), Some(value)) => Ok(Some(MapEntryTypes {
            key: key.kind.clone(),
            value: value.kind.clone(),
        })),
        _ => Err(Error::Collection {
            package: file.package.clone(),
            file: file.path.clone(),
            message: format!(
                "map entry {} must declare 'key' and 'value' fields",
                message.name
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnnotationAnalyzer;
    use wasmjs_schema::ScalarType;

    #[test]
    fn test_indexes_nested_and_map_entries() {
        let string = FieldKind::Scalar(ScalarType::String);
        let file = SchemaFile::new("library/v1/models/lib.schema", "library.v1").with_message(
            MessageDef::new("Book")
                .with_nested(MessageDef::map_entry("TagsEntry", string.clone(), string.clone()))
                .with_nested_enum(EnumDef::new("Format")),
        );

        let index = TypeIndex::build([&file], &AnnotationAnalyzer::new()).unwrap();
        assert_eq!(index.len(), 3);

        let book = index.message(".library.v1.Book").unwrap();
        assert_eq!(book.directory, "library/v1/models");
        assert!(book.is_generated());

        let tags = index.get(".library.v1.Book.TagsEntry").unwrap();
        assert_eq!(tags.map_entry.as_ref().unwrap().value, string);
        assert!(!tags.is_generated());

        let format = index.get(".library.v1.Book.Format").unwrap();
        assert_eq!(format.kind, TypeKind::Enum);
        assert_eq!(format.type_name, "Book_Format");
        assert!(index.message(".library.v1.Book.Format").is_none());
    }

    #[test]
    fn test_duplicate_type_is_a_collection_error() {
        let a = SchemaFile::new("a.schema", "lib").with_message(MessageDef::new("Book"));
        let b = SchemaFile::new("b.schema", "lib").with_message(MessageDef::new("Book"));
        let err = TypeIndex::build([&a, &b], &AnnotationAnalyzer::new()).unwrap_err();
        assert!(matches!(err, Error::Collection { file, .. } if file == "b.schema"));
    }

    #[test]
    fn test_flattened_nested_name_clash() {
        let file = SchemaFile::new("library/v1/shelf.schema", "library.v1")
            .with_message(MessageDef::new("Shelf").with_nested(MessageDef::new("Slot")))
            .with_message(MessageDef::new("Shelf_Slot"));
        let err = TypeIndex::build([&file], &AnnotationAnalyzer::new()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(".library.v1.Shelf.Slot"), "{message}");
        assert!(message.contains(".library.v1.Shelf_Slot"), "{message}");

        // same identifier in another package is fine
        let other = SchemaFile::new("archive/v1/shelf.schema", "archive.v1")
            .with_message(MessageDef::new("Shelf_Slot"));
        let only_nested = SchemaFile::new("library/v1/shelf.schema", "library.v1")
            .with_message(MessageDef::new("Shelf").with_nested(MessageDef::new("Slot")));
        let index = TypeIndex::build([&only_nested, &other], &AnnotationAnalyzer::new()).unwrap();
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_malformed_map_entry() {
        let mut entry = MessageDef::new("BadEntry");
        entry.map_entry = true;
        let file = SchemaFile::new("a.schema", "lib").with_message(entry);
        assert!(TypeIndex::build([&file], &AnnotationAnalyzer::new()).is_err());
    }
}
