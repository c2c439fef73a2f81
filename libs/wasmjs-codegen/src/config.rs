//! Generator configuration
//!
//! Options arrive as a flat `key=value` map, usually packed into the request's
//! parameter string. Everything is validated here, before any collection work.

use crate::error::{Error, Result};
use crate::naming::{is_identifier, to_lower_camel};
use crate::paths::normalize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const KNOWN_KEYS: &[&str] = &[
    "services",
    "method_include",
    "method_exclude",
    "method_rename",
    "module_name",
    "js_namespace",
    "js_structure",
    "wasm_export_path",
    "ts_export_path",
    "generate_wasm",
    "generate_ts",
    "generate_types",
    "generate_schemas",
    "generate_build_script",
];

/// Layout of generated client files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStructure {
    /// `{package dir}/{service}_client.ts`
    #[default]
    Namespaced,
    /// `{service}_client.ts` at the output root
    Flat,
    /// `{service}/client.ts`
    ServiceBased,
}

impl FromStr for OutputStructure {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "namespaced" => Ok(Self::Namespaced),
            "flat" => Ok(Self::Flat),
            "service_based" => Ok(Self::ServiceBased),
            other => Err(Error::UnknownStructure(other.to_string())),
        }
    }
}

impl fmt::Display for OutputStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Namespaced => "namespaced",
            Self::Flat => "flat",
            Self::ServiceBased => "service_based",
        };
        f.write_str(s)
    }
}

/// Configuration options for one generation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorConfig {
    /// Service allow-list (empty allows every service)
    pub services: Vec<String>,
    /// Method include globs
    pub method_include: Vec<String>,
    /// Method exclude globs
    pub method_exclude: Vec<String>,
    /// Method rename table, in declaration order
    pub method_rename: Vec<(String, String)>,
    pub module_name: String,
    pub js_namespace: String,
    pub structure: OutputStructure,
    /// Output root for host-side wrappers
    pub wasm_export_path: String,
    /// Output root for client-side modules
    pub ts_export_path: String,
    pub generate_wasm: bool,
    pub generate_ts: bool,
    /// Whether message/enum type files are planned
    pub generate_types: bool,
    pub generate_schemas: bool,
    pub generate_build_script: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let module_name = "wasm_services".to_string();
        Self {
            services: Vec::new(),
            method_include: Vec::new(),
            method_exclude: Vec::new(),
            method_rename: Vec::new(),
            js_namespace: to_lower_camel(&module_name),
            module_name,
            structure: OutputStructure::default(),
            wasm_export_path: ".".to_string(),
            ts_export_path: ".".to_string(),
            generate_wasm: true,
            generate_ts: true,
            generate_types: true,
            generate_schemas: true,
            generate_build_script: true,
        }
    }
}

impl GeneratorConfig {
    /// Parse a plugin parameter string (`key=value,key=value`)
    pub fn from_parameter(parameter: &str) -> Result<Self> {
        Self::from_options(&parse_parameter(parameter)?)
    }

    /// Build from an already split option map
    pub fn from_options(options: &BTreeMap<String, String>) -> Result<Self> {
        if let Some(unknown) = options
            .keys()
            .find(|k| !KNOWN_KEYS.contains(&k.as_str()))
        {
            return Err(Error::Config(format!("unknown option '{unknown}'")));
        }

        let mut config = Self::default();
        let get = |key: &str| options.get(key).map(|v| v.trim());

        if let Some(v) = get("services") {
            config.services = split_list(v);
        }
        if let Some(v) = get("method_include") {
            config.method_include = split_list(v);
        }
        if let Some(v) = get("method_exclude") {
            config.method_exclude = split_list(v);
        }
        if let Some(v) = get("method_rename") {
            config.method_rename = parse_renames(v)?;
        }

        if let Some(v) = get("module_name") {
            if !is_identifier(v) {
                return Err(Error::Config(format!(
                    "module_name '{v}' must be a non-empty identifier"
                )));
            }
            config.module_name = v.to_string();
        }
        config.js_namespace = match get("js_namespace") {
            Some(v) if !is_identifier(v) => {
                return Err(Error::Config(format!(
                    "js_namespace '{v}' must be a non-empty identifier"
                )))
            }
            Some(v) => v.to_string(),
            None => to_lower_camel(&config.module_name),
        };
        if let Some(v) = get("js_structure") {
            config.structure = v.parse()?;
        }

        if let Some(v) = get("wasm_export_path") {
            config.wasm_export_path = required_path("wasm_export_path", v)?;
        }
        if let Some(v) = get("ts_export_path") {
            config.ts_export_path = required_path("ts_export_path", v)?;
        }

        for (key, slot) in [
            ("generate_wasm", &mut config.generate_wasm),
            ("generate_ts", &mut config.generate_ts),
            ("generate_types", &mut config.generate_types),
            ("generate_schemas", &mut config.generate_schemas),
            ("generate_build_script", &mut config.generate_build_script),
        ] {
            if let Some(v) = options.get(key) {
                *slot = parse_bool(key, v)?;
            }
        }

        Ok(config)
    }
}

/// Split `key=value` entries; a token without `=` continues the previous value
pub fn parse_parameter(parameter: &str) -> Result<BTreeMap<String, String>> {
    let mut options: BTreeMap<String, String> = BTreeMap::new();
    let mut current: Option<String> = None;

    for token in parameter.split(',').map(str::trim) {
        if token.is_empty() {
            continue;
        }
        match token.split_once('=') {
            Some((key, value)) => {
                let key = key.trim();
                if key.is_empty() {
                    return Err(Error::Config(format!("option '{token}' has an empty key")));
                }
                if options.contains_key(key) {
                    return Err(Error::Config(format!("option '{key}' given more than once")));
                }
                options.insert(key.to_string(), value.trim().to_string());
                current = Some(key.to_string());
            }
            None => {
                let key = current
                    .as_ref()
                    .ok_or_else(|| Error::Config(format!("option '{token}' has no key")))?;
                if let Some(value) = options.get_mut(key) {
                    if !value.is_empty() {
                        value.push(',');
                    }
                    value.push_str(token);
                }
            }
        }
    }

    Ok(options)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_renames(value: &str) -> Result<Vec<(String, String)>> {
    let mut renames: Vec<(String, String)> = Vec::new();
    for entry in split_list(value) {
        let (from, to) = entry.split_once(':').ok_or_else(|| Error::InvalidRename {
            entry: entry.clone(),
            reason: "expected 'OldName:newName'".to_string(),
        })?;
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() {
            return Err(Error::InvalidRename {
                entry: entry.clone(),
                reason: "both sides must be non-empty".to_string(),
            });
        }
        if !is_identifier(to) {
            return Err(Error::InvalidRename {
                entry: entry.clone(),
                reason: format!("'{to}' is not a valid identifier"),
            });
        }
        if renames.iter().any(|(existing, _)| existing == from) {
            return Err(Error::InvalidRename {
                entry: entry.clone(),
                reason: format!("'{from}' is renamed more than once"),
            });
        }
        renames.push((from.to_string(), to.to_string()));
    }
    Ok(renames)
}

/// Output roots stay inside the plugin's output tree: relative, and never
/// climbing above it once normalized
fn required_path(key: &str, value: &str) -> Result<String> {
    let trimmed = value.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') || trimmed.starts_with('\\') {
        return Err(Error::Config(format!(
            "{key} must be a non-empty relative path, got '{value}'"
        )));
    }
    let normalized = normalize(trimmed);
    if normalized == ".." || normalized.starts_with("../") {
        return Err(Error::Config(format!(
            "{key} must not leave the output directory, got '{value}'"
        )));
    }
    if normalized.is_empty() {
        return Ok(".".to_string());
    }
    Ok(normalized)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!(
            "{key} expects a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::from_parameter("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.js_namespace, "wasmServices");
        assert_eq!(config.structure, OutputStructure::Namespaced);
    }

    #[test]
    fn test_continuation_tokens_extend_previous_value() {
        let options =
            parse_parameter("services=LibraryService,AdminService,module_name=library").unwrap();
        assert_eq!(options["services"], "LibraryService,AdminService");
        assert_eq!(options["module_name"], "library");
    }

    #[test]
    fn test_full_parameter() {
        let config = GeneratorConfig::from_parameter(
            "services=LibraryService,method_include=Find*,Get*,method_exclude=*Internal,\
             method_rename=FindBooks:searchBooks,js_structure=flat,generate_schemas=false",
        )
        .unwrap();
        assert_eq!(config.services, vec!["LibraryService"]);
        assert_eq!(config.method_include, vec!["Find*", "Get*"]);
        assert_eq!(config.method_exclude, vec!["*Internal"]);
        assert_eq!(
            config.method_rename,
            vec![("FindBooks".to_string(), "searchBooks".to_string())]
        );
        assert_eq!(config.structure, OutputStructure::Flat);
        assert!(!config.generate_schemas);
    }

    #[test]
    fn test_module_name_drives_namespace() {
        let config = GeneratorConfig::from_parameter("module_name=library_app").unwrap();
        assert_eq!(config.js_namespace, "libraryApp");
        let config =
            GeneratorConfig::from_parameter("module_name=library_app,js_namespace=lib").unwrap();
        assert_eq!(config.js_namespace, "lib");
    }

    #[test]
    fn test_malformed_rename_fails_eagerly() {
        for param in [
            "method_rename=FindBooks",
            "method_rename=FindBooks:",
            "method_rename=:searchBooks",
            "method_rename=FindBooks:search-books",
            "method_rename=A:b,A:c",
        ] {
            let err = GeneratorConfig::from_parameter(param).unwrap_err();
            assert!(matches!(err, Error::InvalidRename { .. }), "{param}: {err}");
        }
    }

    #[test]
    fn test_unknown_structure() {
        let err = GeneratorConfig::from_parameter("js_structure=nested").unwrap_err();
        assert!(matches!(err, Error::UnknownStructure(s) if s == "nested"));
    }

    #[test]
    fn test_config_errors() {
        for param in [
            "ts_export_path=",
            "wasm_export_path=",
            "wasm_export_path=/",
            "generate_ts=maybe",
            "module_name=1bad",
            "bogus=1",
            "=x",
            "orphan",
            "module_name=a,module_name=b",
        ] {
            let err = GeneratorConfig::from_parameter(param).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{param}: {err}");
        }
    }

    #[test]
    fn test_export_paths_drop_trailing_slash() {
        let config = GeneratorConfig::from_parameter("ts_export_path=web/src/gen/").unwrap();
        assert_eq!(config.ts_export_path, "web/src/gen");
    }

    #[test]
    fn test_export_paths_stay_inside_output() {
        for param in [
            "ts_export_path=../../etc",
            "ts_export_path=web/../../up",
            "ts_export_path=..",
            "wasm_export_path=/abs/out",
            "wasm_export_path=\\\\server\\share",
        ] {
            let err = GeneratorConfig::from_parameter(param).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{param}: {err}");
        }

        let config =
            GeneratorConfig::from_parameter("ts_export_path=./web/./gen,wasm_export_path=src/..")
                .unwrap();
        assert_eq!(config.ts_export_path, "web/gen");
        assert_eq!(config.wasm_export_path, ".");
    }
}
