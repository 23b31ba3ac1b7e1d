//! Field metadata for claim records
//!
//! A [`Schema`] tells the pipeline which fields are dropped before prediction,
//! which are numeric, and how categorical fields are encoded. Fields the
//! schema does not mention fall back to their loaded dtype.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Role a field plays in the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    Numeric,
    Categorical,
}

/// How a categorical field becomes a numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum EncodingRule {
    /// Yes/no spellings map to 1/0.
    Binary,
    /// Codes assigned by first appearance in the batch, counting from `start`.
    Ordinal {
        #[serde(default)]
        start: u32,
    },
}

impl EncodingRule {
    pub const ORDINAL: EncodingRule = EncodingRule::Ordinal { start: 0 };
}

/// Per-field metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub role: FieldRole,
    /// Removed by the cleaner before any other stage sees the batch
    #[serde(default)]
    pub dropped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<EncodingRule>,
}

impl FieldSpec {
    pub fn numeric(name: &str) -> Self {
        Self {
            name: name.to_string(),
            role: FieldRole::Numeric,
            dropped: false,
            encoding: None,
        }
    }

    pub fn categorical(name: &str, encoding: Option<EncodingRule>) -> Self {
        Self {
            name: name.to_string(),
            role: FieldRole::Categorical,
            dropped: false,
            encoding,
        }
    }

    pub fn dropped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            role: FieldRole::Categorical,
            dropped: true,
            encoding: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldSpec>,
}

/// Fields of the claim dataset that carry no predictive signal (identifiers,
/// dates, locations, free text) plus the label itself.
pub const CLAIM_DROP_FIELDS: &[&str] = &[
    "policy_number",
    "policy_bind_date",
    "policy_state",
    "insured_zip",
    "incident_location",
    "incident_date",
    "incident_state",
    "incident_city",
    "insured_hobbies",
    "auto_make",
    "auto_model",
    "auto_year",
    "age",
    "total_claim_amount",
    "fraud_reported",
    "_c39",
];

const CLAIM_NUMERIC_FIELDS: &[&str] = &[
    "months_as_customer",
    "policy_deductable",
    "policy_annual_premium",
    "umbrella_limit",
    "capital-gains",
    "capital-loss",
    "incident_hour_of_the_day",
    "number_of_vehicles_involved",
    "bodily_injuries",
    "witnesses",
    "injury_claim",
    "property_claim",
    "vehicle_claim",
];

const CLAIM_ORDINAL_FIELDS: &[&str] = &[
    "insured_sex",
    "insured_education_level",
    "insured_occupation",
    "insured_relationship",
    "incident_type",
    "collision_type",
    "incident_severity",
    "authorities_contacted",
];

const CLAIM_BINARY_FIELDS: &[&str] = &["property_damage", "police_report_available"];

impl Schema {
    /// An empty schema: nothing dropped, every role inferred from the data.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The insurance claim record layout.
    pub fn claims() -> Self {
        let mut fields: Vec<FieldSpec> = CLAIM_DROP_FIELDS
            .iter()
            .map(|name| FieldSpec::dropped(name))
            .collect();
        fields.extend(CLAIM_NUMERIC_FIELDS.iter().map(|name| FieldSpec::numeric(name)));
        // Coverage limits ("250/500") keep their one-based codes.
        fields.push(FieldSpec::categorical(
            "policy_csl",
            Some(EncodingRule::Ordinal { start: 1 }),
        ));
        fields.extend(
            CLAIM_ORDINAL_FIELDS
                .iter()
                .map(|name| FieldSpec::categorical(name, Some(EncodingRule::ORDINAL))),
        );
        fields.extend(
            CLAIM_BINARY_FIELDS
                .iter()
                .map(|name| FieldSpec::categorical(name, Some(EncodingRule::Binary))),
        );
        Self { fields }
    }

    /// Read a schema from a JSON file and validate it.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::corrupt(path, e))?;
        let schema: Schema =
            serde_json::from_str(&text).map_err(|e| PipelineError::corrupt(path, e))?;
        schema
            .validate()
            .map_err(|e| PipelineError::corrupt(path, e))?;
        Ok(schema)
    }

    /// Reject duplicate names and encoding rules on numeric fields.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(PipelineError::schema(format!(
                    "field '{}' is declared more than once",
                    field.name
                )));
            }
            if field.role == FieldRole::Numeric && field.encoding.is_some() {
                return Err(PipelineError::schema(format!(
                    "numeric field '{}' cannot carry an encoding rule",
                    field.name
                )));
            }
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn drop_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.dropped)
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn role(&self, name: &str) -> Option<FieldRole> {
        self.field(name).filter(|f| !f.dropped).map(|f| f.role)
    }

    pub fn encoding(&self, name: &str) -> Option<EncodingRule> {
        self.field(name).and_then(|f| f.encoding)
    }
}
