//! Annotation-driven questions about schema elements
//!
//! All knowledge of annotation identifiers and payload shapes lives here. Malformed
//! payloads never abort generation: they are logged and treated as absent.

use serde_json::Value;
use wasmjs_schema::{Annotations, EnumDef, MessageDef, MethodDef, SchemaFile, ServiceDef};

pub const BROWSER_PROVIDED: &str = "wasmjs.v1.browser_provided";
pub const SERVICE_EXCLUDE: &str = "wasmjs.v1.wasm_service_exclude";
pub const SERVICE_NAME: &str = "wasmjs.v1.wasm_service_name";
pub const METHOD_EXCLUDE: &str = "wasmjs.v1.wasm_method_exclude";
pub const METHOD_NAME: &str = "wasmjs.v1.wasm_method_name";
pub const ASYNC_METHOD: &str = "wasmjs.v1.async_method";
pub const TYPE_EXCLUDE: &str = "wasmjs.v1.exclude_type";
pub const TS_FACTORY: &str = "wasmjs.v1.ts_factory";

/// Async call options for a method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AsyncOptions {
    pub is_async: bool,
    pub timeout_ms: Option<u32>,
}

/// Structural questions the collector and planners ask about schema elements
pub trait SchemaAnalyzer {
    fn is_browser_provided(&self, service: &ServiceDef) -> bool;

    fn is_service_excluded(&self, service: &ServiceDef) -> bool;

    fn is_method_excluded(&self, method: &MethodDef) -> bool;

    fn service_custom_name(&self, service: &ServiceDef) -> Option<String>;

    fn method_custom_name(&self, method: &MethodDef) -> Option<String>;

    fn async_options(&self, method: &MethodDef) -> AsyncOptions;

    fn is_async(&self, method: &MethodDef) -> bool {
        self.async_options(method).is_async
    }

    fn is_map_entry(&self, message: &MessageDef) -> bool;

    fn is_message_excluded(&self, message: &MessageDef) -> bool;

    fn is_enum_excluded(&self, enum_def: &EnumDef) -> bool;

    fn has_factory_marker(&self, file: &SchemaFile) -> bool;
}

/// Reads the `wasmjs.v1.*` annotations attached by the front-end
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationAnalyzer;

impl AnnotationAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaAnalyzer for AnnotationAnalyzer {
    fn is_browser_provided(&self, service: &ServiceDef) -> bool {
        flag(&service.annotations, BROWSER_PROVIDED, &service.name)
    }

    fn is_service_excluded(&self, service: &ServiceDef) -> bool {
        flag(&service.annotations, SERVICE_EXCLUDE, &service.name)
    }

    fn is_method_excluded(&self, method: &MethodDef) -> bool {
        flag(&method.annotations, METHOD_EXCLUDE, &method.name)
    }

    fn service_custom_name(&self, service: &ServiceDef) -> Option<String> {
        name(&service.annotations, SERVICE_NAME, &service.name)
    }

    fn method_custom_name(&self, method: &MethodDef) -> Option<String> {
        name(&method.annotations, METHOD_NAME, &method.name)
    }

    fn async_options(&self, method: &MethodDef) -> AsyncOptions {
        match method.annotations.get(ASYNC_METHOD) {
            None => AsyncOptions::default(),
            Some(Value::Bool(is_async)) => AsyncOptions {
                is_async: *is_async,
                timeout_ms: None,
            },
            Some(Value::Object(obj)) => {
                let is_async = match obj.get("is_async") {
                    None => true,
                    Some(Value::Bool(b)) => *b,
                    Some(_) => {
                        malformed(ASYNC_METHOD, &method.name, "is_async must be a boolean");
                        return AsyncOptions::default();
                    }
                };
                let timeout_ms = match obj.get("timeout_ms") {
                    None | Some(Value::Null) => None,
                    Some(v) => match v.as_u64().and_then(|n| u32::try_from(n).ok()) {
                        Some(n) if n > 0 => Some(n),
                        _ => {
                            malformed(
                                ASYNC_METHOD,
                                &method.name,
                                "timeout_ms must be a positive 32-bit integer",
                            );
                            return AsyncOptions::default();
                        }
                    },
                };
                AsyncOptions {
                    is_async,
                    timeout_ms,
                }
            }
            Some(_) => {
                malformed(ASYNC_METHOD, &method.name, "expected a boolean or an object");
                AsyncOptions::default()
            }
        }
    }

    fn is_map_entry(&self, message: &MessageDef) -> bool {
        message.map_entry
    }

    fn is_message_excluded(&self, message: &MessageDef) -> bool {
        flag(&message.annotations, TYPE_EXCLUDE, &message.name)
    }

    fn is_enum_excluded(&self, enum_def: &EnumDef) -> bool {
        flag(&enum_def.annotations, TYPE_EXCLUDE, &enum_def.name)
    }

    fn has_factory_marker(&self, file: &SchemaFile) -> bool {
        flag(&file.annotations, TS_FACTORY, &file.path)
    }
}

fn flag(annotations: &Annotations, id: &str, element: &str) -> bool {
    match annotations.get(id) {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            malformed(id, element, "expected a boolean");
            false
        }
    }
}

fn name(annotations: &Annotations, id: &str, element: &str) -> Option<String> {
    match annotations.get(id) {
        None => None,
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(_) => {
            malformed(id, element, "expected a non-empty string");
            None
        }
    }
}

fn malformed(annotation: &str, element: &str, problem: &str) {
    tracing::warn!(
        annotation,
        element,
        problem,
        "Ignoring malformed annotation payload"
    );
}
