//! Service layer for instanlp business logic.
//!
//! Services can be used by the CLI or other interfaces.

pub mod annotate;

pub use annotate::{
    annotate_bio, annotate_captions, process_account, AccountOutcome, AnnotationEvent,
    AnnotationJob, AnnotationService, BatchResult,
};
