//! Preview and generation results.

use serde::{Deserialize, Serialize};

/// Status of one template field against supplied data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStatus {
    /// Field name as found in the template
    pub name: String,

    /// Supplied value, if any
    pub value: Option<String>,
}

impl FieldStatus {
    /// Check whether a value was supplied for the field.
    pub fn is_matched(&self) -> bool {
        self.value.is_some()
    }
}

/// Dry-run report of what a substitution would do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    /// Every template field, sorted by name
    pub fields: Vec<FieldStatus>,

    /// Supplied keys that the template does not use, sorted
    pub unknown_keys: Vec<String>,
}

impl Preview {
    /// Get the number of template fields.
    pub fn total_fields(&self) -> usize {
        self.fields.len()
    }

    /// Get the number of fields with a supplied value.
    pub fn matched_count(&self) -> usize {
        self.fields.iter().filter(|f| f.is_matched()).count()
    }

    /// Get the number of fields without a value.
    pub fn unmatched_count(&self) -> usize {
        self.total_fields() - self.matched_count()
    }

    /// Names of fields without a value.
    pub fn unmatched(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| !f.is_matched())
            .map(|f| f.name.as_str())
    }
}

/// Statistics collected while substituting a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillStats {
    /// Regions searched for tokens (regions an observer skipped are not counted)
    pub regions_scanned: usize,

    /// Regions whose text changed
    pub regions_rewritten: usize,

    /// Regions rewritten by collapsing their runs
    pub regions_collapsed: usize,

    /// Tokens replaced
    pub replacements: usize,

    /// Distinct field names that were replaced, sorted
    pub replaced_fields: Vec<String>,
}

impl FillStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_field(&mut self, name: &str) {
        if let Err(pos) = self.replaced_fields.binary_search_by(|f| f.as_str().cmp(name)) {
            self.replaced_fields.insert(pos, name.to_string());
        }
    }
}

/// A generated document.
#[derive(Debug, Clone, Serialize)]
pub struct Generated {
    /// DOCX bytes of the filled document
    #[serde(skip)]
    pub bytes: Vec<u8>,

    /// Total number of tokens replaced
    pub replacements: usize,

    /// Template fields that received a value, sorted
    pub replaced_fields: Vec<String>,

    /// Substitution statistics
    pub stats: FillStats,
}

impl Generated {
    pub(crate) fn new(bytes: Vec<u8>, stats: FillStats) -> Self {
        Self {
            bytes,
            replacements: stats.replacements,
            replaced_fields: stats.replaced_fields.clone(),
            stats,
        }
    }

    /// Check whether no token was replaced.
    pub fn is_unchanged(&self) -> bool {
        self.replacements == 0
    }

    /// Get the output size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the output is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_counts() {
        let preview = Preview {
            fields: vec![
                FieldStatus {
                    name: "a".into(),
                    value: Some("1".into()),
                },
                FieldStatus {
                    name: "b".into(),
                    value: None,
                },
            ],
            unknown_keys: vec!["z".into()],
        };
        assert_eq!(preview.total_fields(), 2);
        assert_eq!(preview.matched_count(), 1);
        assert_eq!(preview.unmatched_count(), 1);
        assert_eq!(preview.unmatched().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_stats_add_field_sorted_unique() {
        let mut stats = FillStats::new();
        stats.add_field("zeta");
        stats.add_field("alpha");
        stats.add_field("zeta");
        assert_eq!(stats.replaced_fields, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_generated_json_skips_bytes() {
        let mut stats = FillStats::new();
        stats.replacements = 2;
        stats.add_field("name");
        let generated = Generated::new(vec![1, 2, 3], stats);
        let json = serde_json::to_value(&generated).unwrap();
        assert!(json.get("bytes").is_none());
        assert_eq!(json["replacements"], 2);
        assert_eq!(generated.len(), 3);
        assert!(!generated.is_unchanged());
    }
}
