//! Identifier, file-name and module-name conversions

use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};

/// `FindBooks` -> `findBooks`
pub fn to_lower_camel(name: &str) -> String {
    name.to_lower_camel_case()
}

/// `library_service` -> `LibraryService`
pub fn to_upper_camel(name: &str) -> String {
    name.to_upper_camel_case()
}

/// `LibraryService` -> `library_service`
pub fn to_snake(name: &str) -> String {
    name.to_snake_case()
}

/// `BookStatus` -> `BOOK_STATUS`
pub fn to_shouty_snake(name: &str) -> String {
    name.to_shouty_snake_case()
}

/// `library.v1` -> `library_v1`
pub fn package_to_underscore(package: &str) -> String {
    package
        .split('.')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// File stem of a schema path: `library/v1/models/lib.schema` -> `lib`
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Generated identifier for a (possibly nested) declaration: `["Shelf", "Slot"]` -> `Shelf_Slot`
pub fn nested_type_name(path: &[&str]) -> String {
    path.join("_")
}

/// File name of a per-service client: `LibraryService` -> `library_service_client`
pub fn service_client_stem(service: &str) -> String {
    format!("{}_client", to_snake(service))
}

/// Identifier check for module names and similar config values
pub fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// JSON name of a field when the front-end did not report one
pub fn json_name(field: &str) -> String {
    to_lower_camel(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_lower_camel("FindBooks"), "findBooks");
        assert_eq!(to_upper_camel("library_service"), "LibraryService");
        assert_eq!(to_snake("LibraryService"), "library_service");
        assert_eq!(to_shouty_snake("BookStatus"), "BOOK_STATUS");
    }

    #[test]
    fn test_package_to_underscore() {
        assert_eq!(package_to_underscore("library.v1"), "library_v1");
        assert_eq!(package_to_underscore("a.b.c"), "a_b_c");
        assert_eq!(package_to_underscore(""), "");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("library/v1/models/lib.schema"), "lib");
        assert_eq!(file_stem("lib.schema"), "lib");
        assert_eq!(file_stem("noext"), "noext");
        assert_eq!(file_stem("dir/.hidden"), ".hidden");
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("wasm_services"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("has-dash"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_service_client_stem() {
        assert_eq!(service_client_stem("LibraryService"), "library_service_client");
    }
}
