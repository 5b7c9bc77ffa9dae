//! Structured assembly metadata returned by a provider.

use serde::{Deserialize, Serialize};

/// Model-generated description of an assembly. Every field is optional
/// since the model is free to omit anything it cannot infer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    /// Brief description of what the assembly might be.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Categories or tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Estimated complexity: low, medium or high.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    /// Possible industry or application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Cleaned-up component names (numeric suffixes stripped).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,
}

impl AssemblyMetadata {
    /// Whether the model produced any content at all.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.categories.is_empty()
            && self.complexity.is_none()
            && self.industry.is_none()
            && self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_deserializes_as_empty() {
        let meta: AssemblyMetadata = serde_json::from_str("{}").unwrap();
        assert!(meta.is_empty());
    }

    #[test]
    fn partial_object_is_not_empty() {
        let meta: AssemblyMetadata =
            serde_json::from_str(r#"{"description":"a gearbox","complexity":"medium"}"#).unwrap();
        assert!(!meta.is_empty());
        assert_eq!(meta.description.as_deref(), Some("a gearbox"));
        assert!(meta.categories.is_empty());
    }

    #[test]
    fn serialization_skips_absent_fields() {
        let meta = AssemblyMetadata {
            description: Some("a bracket".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"description":"a bracket"}"#);
    }
}
