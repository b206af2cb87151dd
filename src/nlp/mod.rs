//! CoreNLP annotation model and the entity/relation aggregator.
//!
//! The aggregator is pure: it takes a decoded [`AnnotationResult`] and returns
//! an [`NlpResult`]. Structural problems are caught while decoding, before
//! aggregation starts.

mod aggregate;
mod error;
mod types;

pub use aggregate::{
    aggregate, aggregate_response, EntityCollection, NlpResult, ReferenceCollection,
};
pub use error::NlpError;
pub use types::{
    AnnotationResponse, AnnotationResult, DependencyEdge, EntityMention, EntityType,
    GraphVariant, SentenceAnnotation,
};
