//! Pipeline configuration

use super::cleaner::DEFAULT_PLACEHOLDER;
use super::schema::Schema;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Fields removed before any other stage runs
    pub drop_fields: Vec<String>,
    /// Tokens that mean "missing" in the raw export
    pub placeholders: Vec<String>,
    pub schema: Schema,
}

impl PipelineConfig {
    /// Configuration driven by `schema`: its dropped fields and the default
    /// placeholder.
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            drop_fields: schema.drop_fields(),
            placeholders: vec![DEFAULT_PLACEHOLDER.to_string()],
            schema,
        }
    }

    /// Add extra fields to drop, skipping duplicates.
    pub fn drop_also<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if !self.drop_fields.contains(&field) {
                self.drop_fields.push(field);
            }
        }
        self
    }

    pub fn with_placeholders(mut self, placeholders: Vec<String>) -> Self {
        self.placeholders = placeholders;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_schema(Schema::claims())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_drops_claim_identifiers() {
        let config = PipelineConfig::default();
        assert!(config.drop_fields.contains(&"policy_number".to_string()));
        assert!(config.drop_fields.contains(&"fraud_reported".to_string()));
        assert!(config.drop_fields.contains(&"_c39".to_string()));
        assert_eq!(config.placeholders, vec!["?".to_string()]);
    }

    #[test]
    fn test_drop_also_skips_duplicates() {
        let config = PipelineConfig::with_schema(Schema::empty()).drop_also(["id", "id", "ts"]);
        assert_eq!(config.drop_fields, vec!["id".to_string(), "ts".to_string()]);
    }
}
