//! Parameter schema descriptors.
//!
//! A chain declares its inputs once, as a JSON-schema-like mapping from
//! parameter name to [`ParamSchema`]. The descriptors are passed through to the
//! wire format verbatim; only `order` and `metadata` carry meaning beyond JSON
//! schema, and those are consumed by the remote engine's form renderer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The ordered `name -> descriptor` mapping given to `define_params`.
pub type ParamsSchema = IndexMap<String, ParamSchema>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParamSchema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParamSchema>>,
    /// Display position of the parameter in generated forms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SchemaMetadata>,
    /// Any other JSON-schema keywords, kept in declaration order.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl ParamSchema {
    pub fn of_type(kind: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::of_type("string")
    }

    pub fn number() -> Self {
        Self::of_type("number")
    }

    pub fn integer() -> Self {
        Self::of_type("integer")
    }

    pub fn boolean() -> Self {
        Self::of_type("boolean")
    }

    pub fn object() -> Self {
        Self::of_type("object")
    }

    pub fn array(items: ParamSchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of_type("array")
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_default(mut self, default: impl Into<serde_json::Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_metadata(mut self, metadata: SchemaMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_content_type(self, content_type: ContentType) -> Self {
        let metadata = SchemaMetadata {
            content_type: Some(content_type),
            ..self.metadata.clone().unwrap_or_default()
        };
        self.with_metadata(metadata)
    }

    pub fn with_keyword(mut self, keyword: &str, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(keyword.to_string(), value.into());
        self
    }
}

/// Presentation hints attached to a parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_file_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<EnumChoice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_suggestion_chain: Option<ValueSuggestionChain>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    LongText,
    ShortText,
    FileUrl,
    Code,
    LlmPrompt,
    DatasetId,
    Markdown,
    Chain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumChoice {
    pub description: String,
    pub value: String,
}

/// Another chain that proposes values for this parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSuggestionChain {
    pub url: String,
    pub project_id: String,
    pub output_key: String,
}
