//! Post records produced by the scraper and the caption job's output format.
//!
//! Field names on disk follow the scraper's (Italian) keys; the Rust side uses
//! English names with serde renames.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::nlp::NlpResult;

/// One post entry of `info.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostInfo {
    /// Accessibility caption (alt text) of the image.
    #[serde(rename = "descrizione", default)]
    pub alt_text: Option<String>,
    #[serde(rename = "taggati", default)]
    pub tagged: Option<Vec<TaggedEdge>>,
    #[serde(rename = "testo", default)]
    pub caption: Option<Vec<CaptionEdge>>,
    #[serde(default)]
    pub location: Option<PostLocation>,
    #[serde(rename = "musica", default, skip_serializing_if = "Option::is_none")]
    pub music: Option<Value>,
    #[serde(rename = "nome", default)]
    pub owner_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaggedEdge {
    #[serde(default)]
    pub node: Option<TaggedNode>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaggedNode {
    pub user: TaggedUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TaggedUser {
    #[serde(default)]
    pub full_name: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptionEdge {
    pub node: CaptionNode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptionNode {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostLocation {
    #[serde(default)]
    pub name: Option<String>,
}

impl PostInfo {
    /// Caption text (first caption edge), if the post has a non-empty one.
    pub fn caption_text(&self) -> Option<&str> {
        self.caption
            .as_ref()
            .and_then(|edges| edges.first())
            .map(|edge| edge.node.text.as_str())
            .filter(|text| !text.is_empty())
    }

    pub fn location_name(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.name.as_deref())
    }

    /// Users tagged in the post, skipping empty edges.
    pub fn tagged_users(&self) -> Vec<TaggedUser> {
        self.tagged
            .iter()
            .flatten()
            .filter_map(|edge| edge.node.as_ref())
            .map(|node| node.user.clone())
            .collect()
    }

    /// Metadata for everything except the caption annotation.
    pub fn base_metadata(&self) -> PictureMetadata {
        let tagged = self.tagged_users();
        PictureMetadata {
            caption: None,
            location: self.location_name().map(str::to_string),
            tagged: if tagged.is_empty() { None } else { Some(tagged) },
            alt_text: self.alt_text.clone(),
        }
    }
}

/// Annotated caption of one post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnnotatedCaption {
    #[serde(rename = "testo")]
    pub text: String,
    pub nlp: NlpResult,
}

/// Per-post metadata written by the caption job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PictureMetadata {
    #[serde(rename = "didascalia", default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<AnnotatedCaption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "taggati", default, skip_serializing_if = "Option::is_none")]
    pub tagged: Option<Vec<TaggedUser>>,
    #[serde(rename = "descrizione", default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Picture {
    pub metadata: PictureMetadata,
}

/// Contents of `didascalia_nlp.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CaptionDocument {
    pub pictures: Vec<Picture>,
}
