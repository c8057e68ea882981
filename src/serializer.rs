//! Serialization of the scanned model to YAML or JSON.
//!
//! Used by `--format json|yaml` to hand the analyzer's view of a file to
//! other tools instead of annotation text.

use crate::model::FileAnnotations;
use anyhow::{Context, Result};
use log::debug;

/// Serializes a file's annotations to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(annotations: &FileAnnotations) -> Result<String> {
    debug!("Serializing {} to YAML", annotations.path.display());
    serde_yaml::to_string(annotations).context("Failed to serialize annotations to YAML")
}

/// Serializes a file's annotations to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(annotations: &FileAnnotations) -> Result<String> {
    debug!("Serializing {} to JSON", annotations.path.display());
    serde_json::to_string_pretty(annotations).context("Failed to serialize annotations to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Analyzer, ScanOptions};
    use std::path::Path;

    fn create_test_annotations() -> FileAnnotations {
        let lines = "---@brief Demo\n---@param a number\nfunction M.f(a) end\nM.count = 0"
            .lines()
            .map(String::from)
            .collect();
        Analyzer::new(ScanOptions::default(), None)
            .analyze_lines(Path::new("lua/demo/util.lua"), lines)
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_annotations()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["header"]["module_path"], "demo.util");
        assert_eq!(parsed["header"]["brief"], "Demo");
        assert_eq!(parsed["header"]["class"]["class_name"], "DemoUtil");

        let fields = parsed["header"]["class"]["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0]["kind"], "function");
        assert_eq!(fields[0]["type"], "fun(a: number): any");
        assert_eq!(fields[0]["params"][0]["type"], "number");
        assert_eq!(fields[1]["kind"], "value");
        assert_eq!(fields[1]["source_line"], 4);

        // the raw file content is not part of the model dump
        assert!(parsed.get("original_lines").is_none());
    }

    #[test]
    fn test_serialize_json_pretty_format() {
        let json = serialize_json(&create_test_annotations()).unwrap();
        assert!(json.contains('\n'));
        assert!(json.lines().count() > 5);
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_annotations()).unwrap();

        assert!(yaml.contains("module_path: demo.util"));
        assert!(yaml.contains("class_name: DemoUtil"));
        assert!(yaml.contains("kind: function"));

        let parsed: FileAnnotations = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.header.brief, "Demo");
        assert_eq!(parsed.fields().len(), 2);
        assert!(parsed.original_lines.is_empty());
    }
}
