//! Shell-style method name patterns

use crate::error::{Error, Result};
use regex::Regex;

/// Case-sensitive glob supporting `*` (any run) and `?` (one character)
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(Error::Config("method patterns must not be empty".to_string()));
        }

        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        for c in pattern.chars() {
            match c {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                c => expr.push_str(&regex::escape(&c.to_string())),
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_and_question_mark() {
        let find = GlobPattern::new("Find*").unwrap();
        assert!(find.matches("FindBooks"));
        assert!(find.matches("Find"));
        assert!(!find.matches("findBooks"));
        assert!(!find.matches("RefindBooks"));

        let get = GlobPattern::new("Get?ook").unwrap();
        assert!(get.matches("GetBook"));
        assert!(!get.matches("GetBooks"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let pattern = GlobPattern::new("Get.Book+").unwrap();
        assert!(pattern.matches("Get.Book+"));
        assert!(!pattern.matches("GetXBookk"));
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        assert!(GlobPattern::new("").is_err());
    }
}
