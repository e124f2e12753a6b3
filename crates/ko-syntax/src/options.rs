/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

use serde::{Deserialize, Serialize};

/// Parser configuration
///
/// Deserializes from the camelCase shape used by editor integrations, with
/// missing fields taking their defaults:
///
/// ```rust
/// use ko_syntax::ParserOptions;
///
/// let options: ParserOptions =
///     serde_json::from_str(r#"{"bindingAttributes": ["data-bind", "params"]}"#).unwrap();
/// assert!(options.is_binding_attribute("PARAMS"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserOptions {
    /// Attributes whose values are parsed as binding lists
    pub binding_attributes: Vec<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            binding_attributes: vec!["data-bind".to_string()],
        }
    }
}

impl ParserOptions {
    /// Attribute names compare ASCII-case-insensitively, as in HTML
    pub fn is_binding_attribute(&self, name: &str) -> bool {
        self.binding_attributes
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binds_data_bind() {
        let options = ParserOptions::default();
        assert!(options.is_binding_attribute("data-bind"));
        assert!(options.is_binding_attribute("Data-Bind"));
        assert!(!options.is_binding_attribute("class"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let options: ParserOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ParserOptions::default());
    }
}
