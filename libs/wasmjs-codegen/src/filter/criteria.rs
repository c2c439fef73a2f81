use super::glob::GlobPattern;
use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Declarative inclusion, exclusion and rename rules
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    services: BTreeSet<String>,
    includes: Vec<GlobPattern>,
    excludes: Vec<GlobPattern>,
    renames: BTreeMap<String, String>,
}

impl FilterCriteria {
    pub fn new(
        services: &[String],
        includes: &[String],
        excludes: &[String],
        renames: &[(String, String)],
    ) -> Result<Self> {
        let mut rename_table = BTreeMap::new();
        for (from, to) in renames {
            if from.is_empty() || to.is_empty() {
                return Err(Error::InvalidRename {
                    entry: format!("{from}:{to}"),
                    reason: "both sides must be non-empty".to_string(),
                });
            }
            if rename_table.insert(from.clone(), to.clone()).is_some() {
                return Err(Error::InvalidRename {
                    entry: format!("{from}:{to}"),
                    reason: format!("'{from}' is renamed more than once"),
                });
            }
        }

        Ok(Self {
            services: services.iter().cloned().collect(),
            includes: compile(includes)?,
            excludes: compile(excludes)?,
            renames: rename_table,
        })
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        Self::new(
            &config.services,
            &config.method_include,
            &config.method_exclude,
            &config.method_rename,
        )
    }

    /// Empty allow-list means every service passes
    pub fn allows_service(&self, name: &str) -> bool {
        self.services.is_empty() || self.services.contains(name)
    }

    pub fn service_allow_list(&self) -> &BTreeSet<String> {
        &self.services
    }

    /// First include pattern matching `name`, if any
    pub fn matching_include(&self, name: &str) -> Option<&GlobPattern> {
        self.includes.iter().find(|p| p.matches(name))
    }

    /// First exclude pattern matching `name`, if any
    pub fn matching_exclude(&self, name: &str) -> Option<&GlobPattern> {
        self.excludes.iter().find(|p| p.matches(name))
    }

    pub fn has_includes(&self) -> bool {
        !self.includes.is_empty()
    }

    pub fn rename(&self, name: &str) -> Option<&str> {
        self.renames.get(name).map(String::as_str)
    }
}

fn compile(patterns: &[String]) -> Result<Vec<GlobPattern>> {
    patterns.iter().map(|p| GlobPattern::new(p)).collect()
}
