//! Typed model of a sentence-level CoreNLP annotation.
//!
//! Only the fields the aggregator consumes are modelled. Everything else in the
//! CoreNLP JSON (tokens, indices, character offsets) is ignored on decode.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::NlpError;

/// Entity categories that are kept. Any other NER label is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Person,
    Location,
    Organization,
    Number,
    Date,
    Email,
    Url,
    City,
    StateOrProvince,
    Country,
    Nationality,
    Religion,
    Title,
    Ideology,
}

impl EntityType {
    pub const ALL: [EntityType; 14] = [
        EntityType::Person,
        EntityType::Location,
        EntityType::Organization,
        EntityType::Number,
        EntityType::Date,
        EntityType::Email,
        EntityType::Url,
        EntityType::City,
        EntityType::StateOrProvince,
        EntityType::Country,
        EntityType::Nationality,
        EntityType::Religion,
        EntityType::Title,
        EntityType::Ideology,
    ];

    /// CoreNLP label for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Location => "LOCATION",
            EntityType::Organization => "ORGANIZATION",
            EntityType::Number => "NUMBER",
            EntityType::Date => "DATE",
            EntityType::Email => "EMAIL",
            EntityType::Url => "URL",
            EntityType::City => "CITY",
            EntityType::StateOrProvince => "STATE_OR_PROVINCE",
            EntityType::Country => "COUNTRY",
            EntityType::Nationality => "NATIONALITY",
            EntityType::Religion => "RELIGION",
            EntityType::Title => "TITLE",
            EntityType::Ideology => "IDEOLOGY",
        }
    }

    /// Parse a CoreNLP label. Labels outside the allow-list return `None`.
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == label)
    }

    /// Mentions of governing types become keys of the reference collection.
    pub fn is_governing(&self) -> bool {
        matches!(self, EntityType::Title | EntityType::Organization)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three dependency-parse normalizations CoreNLP emits per sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphVariant {
    Basic,
    Enhanced,
    EnhancedPlusPlus,
}

impl GraphVariant {
    pub const ALL: [GraphVariant; 3] = [
        GraphVariant::Basic,
        GraphVariant::Enhanced,
        GraphVariant::EnhancedPlusPlus,
    ];

    /// Key of the edge list inside a CoreNLP sentence object.
    pub fn json_key(&self) -> &'static str {
        match self {
            GraphVariant::Basic => "basicDependencies",
            GraphVariant::Enhanced => "enhancedDependencies",
            GraphVariant::EnhancedPlusPlus => "enhancedPlusPlusDependencies",
        }
    }
}

/// One edge of a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    #[serde(rename = "governorGloss")]
    pub governor: String,
    #[serde(rename = "dependentGloss")]
    pub dependent: String,
    /// Relation label (`nsubj`, `compound`, ...). Not used by aggregation.
    #[serde(rename = "dep", default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

impl DependencyEdge {
    pub fn new(governor: impl Into<String>, dependent: impl Into<String>) -> Self {
        Self {
            governor: governor.into(),
            dependent: dependent.into(),
            relation: None,
        }
    }
}

/// A labelled entity mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    pub text: String,
    /// Raw NER label; may be outside the allow-list.
    #[serde(rename = "ner")]
    pub label: String,
    /// Per-label confidence scores, when the annotator supplies them.
    #[serde(
        rename = "nerConfidences",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub confidences: Option<Value>,
}

impl EntityMention {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            confidences: None,
        }
    }

    /// Allow-listed type of this mention, or `None` if it should be ignored.
    pub fn entity_type(&self) -> Option<EntityType> {
        EntityType::parse(&self.label)
    }

    /// Confidence for the mention's own label, if one was supplied.
    pub fn confidence(&self) -> Option<f64> {
        self.confidences
            .as_ref()
            .and_then(|c| c.as_object())
            .and_then(|scores| scores.get(&self.label))
            .and_then(Value::as_f64)
    }
}

/// Annotation of a single sentence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentenceAnnotation {
    #[serde(rename = "entitymentions")]
    pub mentions: Vec<EntityMention>,
    #[serde(rename = "basicDependencies")]
    pub basic: Vec<DependencyEdge>,
    #[serde(rename = "enhancedDependencies")]
    pub enhanced: Vec<DependencyEdge>,
    #[serde(rename = "enhancedPlusPlusDependencies")]
    pub enhanced_plus_plus: Vec<DependencyEdge>,
}

impl SentenceAnnotation {
    /// Edges of one dependency-graph variant, in parser order.
    pub fn edges(&self, variant: GraphVariant) -> &[DependencyEdge] {
        match variant {
            GraphVariant::Basic => &self.basic,
            GraphVariant::Enhanced => &self.enhanced,
            GraphVariant::EnhancedPlusPlus => &self.enhanced_plus_plus,
        }
    }

    pub fn edges_mut(&mut self, variant: GraphVariant) -> &mut Vec<DependencyEdge> {
        match variant {
            GraphVariant::Basic => &mut self.basic,
            GraphVariant::Enhanced => &mut self.enhanced,
            GraphVariant::EnhancedPlusPlus => &mut self.enhanced_plus_plus,
        }
    }
}

/// Structured annotation of one text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationResult {
    pub sentences: Vec<SentenceAnnotation>,
}

impl AnnotationResult {
    /// Decode a CoreNLP JSON document.
    ///
    /// Missing required fields are reported as `MalformedAnnotation`.
    pub fn from_value(value: Value) -> Result<Self, NlpError> {
        serde_json::from_value(value).map_err(|e| NlpError::MalformedAnnotation(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, NlpError> {
        serde_json::from_str(json).map_err(|e| NlpError::MalformedAnnotation(e.to_string()))
    }
}

/// What the annotation service answered for one text.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationResponse {
    Structured(AnnotationResult),
    /// Bare error string in place of a structured result.
    Failure(String),
}

impl AnnotationResponse {
    /// Decode either a structured result or a bare-string failure indicator.
    pub fn from_value(value: Value) -> Result<Self, NlpError> {
        match value {
            Value::String(message) => Ok(AnnotationResponse::Failure(message)),
            other => AnnotationResult::from_value(other).map(AnnotationResponse::Structured),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, NlpError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| NlpError::MalformedAnnotation(e.to_string()))?;
        Self::from_value(value)
    }

    /// Structured result, or `UpstreamFailure` when the service reported an error.
    pub fn into_result(self) -> Result<AnnotationResult, NlpError> {
        match self {
            AnnotationResponse::Structured(result) => Ok(result),
            AnnotationResponse::Failure(message) => Err(NlpError::UpstreamFailure(message)),
        }
    }
}
