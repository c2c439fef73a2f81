//! Inclusion, exclusion and rename decisions
//!
//! Every decision carries a human-readable reason so that tests and `RUST_LOG=debug`
//! runs can tell why an element was kept or dropped.
//!
//! Method precedence: annotation exclusion, then exclude patterns, then include
//! patterns. An exclude pattern wins even when an include pattern matches too.

mod criteria;
mod glob;
mod types;

pub use criteria::FilterCriteria;
pub use glob::GlobPattern;
pub use types::{collect_enums, collect_messages, CollectedEnum, CollectedMessage};

use crate::analyzer::SchemaAnalyzer;
use crate::naming::to_lower_camel;
use wasmjs_schema::{MethodDef, ServiceDef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDecision {
    pub include: bool,
    pub reason: String,
}

impl FilterDecision {
    pub fn included(reason: impl Into<String>) -> Self {
        Self {
            include: true,
            reason: reason.into(),
        }
    }

    pub fn excluded(reason: impl Into<String>) -> Self {
        Self {
            include: false,
            reason: reason.into(),
        }
    }
}

pub fn should_include_service(
    service: &ServiceDef,
    analyzer: &dyn SchemaAnalyzer,
    criteria: &FilterCriteria,
) -> FilterDecision {
    if analyzer.is_service_excluded(service) {
        return FilterDecision::excluded(format!(
            "service {} is excluded by annotation",
            service.name
        ));
    }
    if criteria.service_allow_list().is_empty() {
        return FilterDecision::included(format!(
            "service {} included (no service allow-list)",
            service.name
        ));
    }
    if criteria.allows_service(&service.name) {
        FilterDecision::included(format!(
            "service {} is in the allow-list",
            service.name
        ))
    } else {
        FilterDecision::excluded(format!(
            "service {} is not in the allow-list",
            service.name
        ))
    }
}

pub fn should_include_method(
    method: &MethodDef,
    analyzer: &dyn SchemaAnalyzer,
    criteria: &FilterCriteria,
) -> FilterDecision {
    if analyzer.is_method_excluded(method) {
        return FilterDecision::excluded(format!(
            "method {} is excluded by annotation",
            method.name
        ));
    }
    if let Some(pattern) = criteria.matching_exclude(&method.name) {
        return FilterDecision::excluded(format!(
            "method {} matches exclude pattern '{}'",
            method.name,
            pattern.as_str()
        ));
    }
    if !criteria.has_includes() {
        return FilterDecision::included(format!(
            "method {} included (no include patterns)",
            method.name
        ));
    }
    match criteria.matching_include(&method.name) {
        Some(pattern) => FilterDecision::included(format!(
            "method {} matches include pattern '{}'",
            method.name,
            pattern.as_str()
        )),
        None => FilterDecision::excluded(format!(
            "method {} matches no include pattern",
            method.name
        )),
    }
}

/// Rename-table value for a method, or its original name
pub fn rename_target(method: &MethodDef, criteria: &FilterCriteria) -> String {
    criteria
        .rename(&method.name)
        .unwrap_or(method.name.as_str())
        .to_string()
}

/// Externally exposed call name
///
/// The rename table wins over the `wasm_method_name` annotation; without either the
/// method name is lower-camel-cased. Request and response type names never change.
pub fn exposed_method_name(
    method: &MethodDef,
    analyzer: &dyn SchemaAnalyzer,
    criteria: &FilterCriteria,
) -> String {
    if let Some(renamed) = criteria.rename(&method.name) {
        return renamed.to_string();
    }
    analyzer
        .method_custom_name(method)
        .unwrap_or_else(|| to_lower_camel(&method.name))
}

/// Externally exposed service name (annotation or declared name)
pub fn exposed_service_name(service: &ServiceDef, analyzer: &dyn SchemaAnalyzer) -> String {
    analyzer
        .service_custom_name(service)
        .unwrap_or_else(|| service.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{AnnotationAnalyzer, METHOD_EXCLUDE, METHOD_NAME, SERVICE_EXCLUDE};
    use serde_json::json;
    use wasmjs_schema::Annotations;

    fn criteria(services: &[&str], includes: &[&str], excludes: &[&str]) -> FilterCriteria {
        let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        FilterCriteria::new(&owned(services), &owned(includes), &owned(excludes), &[]).unwrap()
    }

    fn method(name: &str) -> MethodDef {
        MethodDef::new(name, ".library.v1.Req", ".library.v1.Res")
    }

    #[test]
    fn test_service_allow_list() {
        let analyzer = AnnotationAnalyzer::new();
        let c = criteria(&["LibraryService"], &[], &[]);
        assert!(should_include_service(&ServiceDef::new("LibraryService"), &analyzer, &c).include);
        let decision = should_include_service(&ServiceDef::new("AdminService"), &analyzer, &c);
        assert!(!decision.include);
        assert!(decision.reason.contains("not in the allow-list"));
    }

    #[test]
    fn test_annotation_excluded_service_beats_allow_list() {
        let analyzer = AnnotationAnalyzer::new();
        let service = ServiceDef::new("LibraryService")
            .with_annotations(Annotations::new().with(SERVICE_EXCLUDE, json!(true)));
        let decision =
            should_include_service(&service, &analyzer, &criteria(&["LibraryService"], &[], &[]));
        assert!(!decision.include);
        assert!(decision.reason.contains("annotation"));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let analyzer = AnnotationAnalyzer::new();
        let c = criteria(&[], &["Find*", "Get*"], &["*Internal"]);

        let decision = should_include_method(&method("FindBooksInternal"), &analyzer, &c);
        assert!(!decision.include);
        assert!(decision.reason.contains("*Internal"));

        let decision = should_include_method(&method("CreateBook"), &analyzer, &c);
        assert!(!decision.include);
        assert!(decision.reason.contains("no include pattern"));

        let decision = should_include_method(&method("FindBooks"), &analyzer, &c);
        assert!(decision.include);
        assert!(decision.reason.contains("Find*"));
    }

    #[test]
    fn test_annotation_excluded_method() {
        let analyzer = AnnotationAnalyzer::new();
        let m = method("FindBooks")
            .with_annotations(Annotations::new().with(METHOD_EXCLUDE, json!(true)));
        assert!(!should_include_method(&m, &analyzer, &criteria(&[], &[], &[])).include);
    }

    #[test]
    fn test_exposed_name_precedence() {
        let analyzer = AnnotationAnalyzer::new();
        let renames = vec![("FindBooks".to_string(), "searchBooks".to_string())];
        let with_rename = FilterCriteria::new(&[], &[], &[], &renames).unwrap();
        let plain = FilterCriteria::default();

        let annotated = method("FindBooks")
            .with_annotations(Annotations::new().with(METHOD_NAME, json!("lookupBooks")));

        assert_eq!(exposed_method_name(&annotated, &analyzer, &with_rename), "searchBooks");
        assert_eq!(exposed_method_name(&annotated, &analyzer, &plain), "lookupBooks");
        assert_eq!(exposed_method_name(&method("FindBooks"), &analyzer, &plain), "findBooks");
        assert_eq!(rename_target(&method("FindBooks"), &with_rename), "searchBooks");
        assert_eq!(rename_target(&method("GetBook"), &with_rename), "GetBook");
    }
}
