//! Entity and relation aggregation over one annotated text.
//!
//! Folds every sentence of an [`AnnotationResult`] into two structures:
//! entity mentions grouped by type, and dependents grouped by the
//! title/organization mention that governs them.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use super::error::NlpError;
use super::types::{AnnotationResponse, AnnotationResult, EntityType, GraphVariant};

/// Entity mentions grouped by type.
///
/// Types keep the order of their first mention; mentions keep insertion order
/// and duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityCollection {
    groups: Vec<(EntityType, Vec<String>)>,
    index: HashMap<EntityType, usize>,
}

impl EntityCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mention, creating the type's group on first use.
    pub fn push(&mut self, entity_type: EntityType, mention: &str) {
        let slot = match self.index.get(&entity_type) {
            Some(&slot) => slot,
            None => {
                self.groups.push((entity_type, Vec::new()));
                let slot = self.groups.len() - 1;
                self.index.insert(entity_type, slot);
                slot
            }
        };
        self.groups[slot].1.push(mention.to_string());
    }

    pub fn get(&self, entity_type: EntityType) -> Option<&[String]> {
        self.index
            .get(&entity_type)
            .map(|&slot| self.groups[slot].1.as_slice())
    }

    /// Groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityType, &[String])> {
        self.groups.iter().map(|(t, m)| (*t, m.as_slice()))
    }

    /// Number of distinct types present.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total mentions across all types.
    pub fn mention_count(&self) -> usize {
        self.groups.iter().map(|(_, m)| m.len()).sum()
    }
}

/// Serialized as a list of single-key maps: `[{"PERSON": [..]}, ...]`.
impl Serialize for EntityCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.groups.len()))?;
        for (entity_type, mentions) in &self.groups {
            let mut entry = BTreeMap::new();
            entry.insert(entity_type.as_str(), mentions);
            seq.serialize_element(&entry)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for EntityCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries: Vec<BTreeMap<String, Vec<String>>> = Vec::deserialize(deserializer)?;
        let mut collection = EntityCollection::new();
        for (label, mentions) in entries.into_iter().flatten() {
            let entity_type = EntityType::parse(&label)
                .ok_or_else(|| de::Error::custom(format!("unknown entity type: {}", label)))?;
            for mention in &mentions {
                collection.push(entity_type, mention);
            }
        }
        Ok(collection)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct DependentSet {
    ordered: Vec<String>,
    members: HashSet<String>,
}

impl DependentSet {
    fn insert(&mut self, dependent: &str) -> bool {
        if self.members.contains(dependent) {
            return false;
        }
        self.members.insert(dependent.to_string());
        self.ordered.push(dependent.to_string());
        true
    }
}

/// Distinct dependents grouped by tracked governor.
///
/// Dependents are deduplicated per governor. They are kept in first-seen
/// order so output is reproducible, but callers should treat them as a set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceCollection {
    groups: Vec<(String, DependentSet)>,
    index: HashMap<String, usize>,
}

impl ReferenceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `dependent` under `governor`. Returns false if it was already present.
    pub fn insert(&mut self, governor: &str, dependent: &str) -> bool {
        let slot = match self.index.get(governor) {
            Some(&slot) => slot,
            None => {
                self.groups
                    .push((governor.to_string(), DependentSet::default()));
                let slot = self.groups.len() - 1;
                self.index.insert(governor.to_string(), slot);
                slot
            }
        };
        self.groups[slot].1.insert(dependent)
    }

    pub fn get(&self, governor: &str) -> Option<&[String]> {
        self.index
            .get(governor)
            .map(|&slot| self.groups[slot].1.ordered.as_slice())
    }

    pub fn contains(&self, governor: &str, dependent: &str) -> bool {
        self.index
            .get(governor)
            .is_some_and(|&slot| self.groups[slot].1.members.contains(dependent))
    }

    pub fn governors(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(g, _)| g.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(g, set)| (g.as_str(), set.ordered.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Serialized as a list of single-key maps: `[{"Acme Corp": [..]}, ...]`.
impl Serialize for ReferenceCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.groups.len()))?;
        for (governor, dependents) in &self.groups {
            let mut entry = BTreeMap::new();
            entry.insert(governor.as_str(), &dependents.ordered);
            seq.serialize_element(&entry)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ReferenceCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries: Vec<BTreeMap<String, Vec<String>>> = Vec::deserialize(deserializer)?;
        let mut collection = ReferenceCollection::new();
        for (governor, dependents) in entries.into_iter().flatten() {
            for dependent in &dependents {
                collection.insert(&governor, dependent);
            }
        }
        Ok(collection)
    }
}

/// Aggregated output for one text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NlpResult {
    pub entities: EntityCollection,
    pub references: ReferenceCollection,
}

impl NlpResult {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.references.is_empty()
    }

    pub fn into_parts(self) -> (EntityCollection, ReferenceCollection) {
        (self.entities, self.references)
    }
}

/// Aggregate one annotated text.
pub fn aggregate(result: &AnnotationResult) -> NlpResult {
    let mut entities = EntityCollection::new();
    let mut references = ReferenceCollection::new();

    for (position, sentence) in result.sentences.iter().enumerate() {
        // Governors are only tracked within the sentence that mentions them.
        let mut tracked: HashSet<&str> = HashSet::new();

        for mention in &sentence.mentions {
            let Some(entity_type) = mention.entity_type() else {
                continue;
            };

            // Confidence is inspected but never affects the output.
            if let Some(confidence) = mention.confidence() {
                tracing::trace!(
                    "sentence {}: {} '{}' confidence {:.3}",
                    position,
                    entity_type,
                    mention.text,
                    confidence
                );
            }

            entities.push(entity_type, &mention.text);
            if entity_type.is_governing() {
                tracked.insert(mention.text.as_str());
            }
        }

        if tracked.is_empty() {
            continue;
        }

        for variant in GraphVariant::ALL {
            for edge in sentence.edges(variant) {
                if tracked.contains(edge.governor.as_str()) {
                    references.insert(&edge.governor, &edge.dependent);
                }
            }
        }
    }

    tracing::debug!(
        "Aggregated {} sentences: {} mentions in {} types, {} governors",
        result.sentences.len(),
        entities.mention_count(),
        entities.len(),
        references.len()
    );

    NlpResult {
        entities,
        references,
    }
}

/// Aggregate a service response, surfacing a bare-string answer as `UpstreamFailure`.
pub fn aggregate_response(response: &AnnotationResponse) -> Result<NlpResult, NlpError> {
    match response {
        AnnotationResponse::Structured(result) => Ok(aggregate(result)),
        AnnotationResponse::Failure(message) => Err(NlpError::UpstreamFailure(message.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::types::{DependencyEdge, EntityMention, SentenceAnnotation};
    use serde_json::json;

    fn sentence(mentions: &[(&str, &str)], basic: &[(&str, &str)]) -> SentenceAnnotation {
        SentenceAnnotation {
            mentions: mentions
                .iter()
                .map(|(text, label)| EntityMention::new(*text, *label))
                .collect(),
            basic: basic
                .iter()
                .map(|(g, d)| DependencyEdge::new(*g, *d))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_result_yields_empty_collections() {
        let out = aggregate(&AnnotationResult::default());
        assert!(out.entities.is_empty());
        assert!(out.references.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn test_unknown_types_are_dropped() {
        let result = AnnotationResult {
            sentences: vec![sentence(
                &[("Thing", "MISC"), ("Bob", "PERSON"), ("CEO", "CRIMINAL_CHARGE")],
                &[("Thing", "x"), ("CEO", "y")],
            )],
        };

        let out = aggregate(&result);
        assert_eq!(out.entities.len(), 1);
        assert_eq!(out.entities.get(EntityType::Person).unwrap(), ["Bob"]);
        assert!(out.references.is_empty());
    }

    #[test]
    fn test_duplicate_mentions_preserved_in_order() {
        let result = AnnotationResult {
            sentences: vec![
                sentence(&[("Rome", "CITY"), ("Milan", "CITY")], &[]),
                sentence(&[("Rome", "CITY")], &[]),
            ],
        };

        let out = aggregate(&result);
        assert_eq!(
            out.entities.get(EntityType::City).unwrap(),
            ["Rome", "Milan", "Rome"]
        );
    }

    #[test]
    fn test_type_order_follows_first_mention() {
        let result = AnnotationResult {
            sentences: vec![
                sentence(&[("2020", "DATE"), ("Ann", "PERSON")], &[]),
                sentence(&[("Bob", "PERSON"), ("Italy", "COUNTRY")], &[]),
            ],
        };

        let types: Vec<_> = aggregate(&result).entities.iter().map(|(t, _)| t).collect();
        assert_eq!(
            types,
            vec![EntityType::Date, EntityType::Person, EntityType::Country]
        );
    }

    #[test]
    fn test_tracking_resets_per_sentence() {
        let result = AnnotationResult {
            sentences: vec![
                sentence(&[("CEO", "TITLE")], &[("CEO", "former")]),
                // "CEO" is not mentioned here, so this edge must not count.
                sentence(&[("Bob", "PERSON")], &[("CEO", "new")]),
            ],
        };

        let out = aggregate(&result);
        assert_eq!(out.references.get("CEO").unwrap(), ["former"]);
        assert!(!out.references.contains("CEO", "new"));
    }

    #[test]
    fn test_empty_and_self_dependents_recorded() {
        let result = AnnotationResult {
            sentences: vec![sentence(
                &[("Acme", "ORGANIZATION")],
                &[("Acme", ""), ("Acme", "Acme")],
            )],
        };

        let out = aggregate(&result);
        assert_eq!(out.references.get("Acme").unwrap(), ["", "Acme"]);
    }

    #[test]
    fn test_all_variants_contribute() {
        let mut s = sentence(&[("Senate", "ORGANIZATION")], &[("Senate", "the")]);
        s.enhanced.push(DependencyEdge::new("Senate", "the"));
        s.enhanced.push(DependencyEdge::new("Senate", "US"));
        s.enhanced_plus_plus
            .push(DependencyEdge::new("Senate", "voted"));

        let out = aggregate(&AnnotationResult { sentences: vec![s] });
        assert_eq!(out.references.get("Senate").unwrap(), ["the", "US", "voted"]);
    }

    #[test]
    fn test_output_shape_is_list_of_single_key_maps() {
        let result = AnnotationResult {
            sentences: vec![sentence(
                &[("Dr. Smith", "PERSON"), ("Acme Corp", "ORGANIZATION")],
                &[("Acme Corp", "sponsor")],
            )],
        };

        let value = serde_json::to_value(aggregate(&result)).unwrap();
        assert_eq!(
            value,
            json!({
                "entities": [{"PERSON": ["Dr. Smith"]}, {"ORGANIZATION": ["Acme Corp"]}],
                "references": [{"Acme Corp": ["sponsor"]}]
            })
        );
    }

    #[test]
    fn test_persisted_output_reads_back() {
        let stored = json!({
            "entities": [{"TITLE": ["CEO", "CEO"]}, {"CITY": ["Rome"]}],
            "references": [{"CEO": ["former", "new"]}]
        });

        let out: NlpResult = serde_json::from_value(stored).unwrap();
        assert_eq!(out.entities.get(EntityType::Title).unwrap(), ["CEO", "CEO"]);
        assert_eq!(out.references.get("CEO").unwrap(), ["former", "new"]);
    }

    #[test]
    fn test_upstream_failure_is_not_aggregated() {
        let err = aggregate_response(&AnnotationResponse::Failure("boom".into())).unwrap_err();
        assert!(err.is_upstream_failure());
    }
}
