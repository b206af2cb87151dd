//! instanlp - entity and relation aggregation for scraped social-media accounts.
//!
//! Sends biographies and post captions to a Stanford CoreNLP server and
//! condenses each annotation into typed entity groups plus the dependency
//! references of the entities that govern them.

pub mod cli;
pub mod config;
pub mod corenlp;
pub mod dataset;
pub mod nlp;
pub mod services;
