// Kitsu edge API models (JSON:API)
// https://kitsu.docs.apiary.io/

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Response envelopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitsuResource<A> {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: A,
    #[serde(default)]
    pub relationships: BTreeMap<String, Relationship>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitsuCollection<A> {
    pub data: Vec<KitsuResource<A>>,
    #[serde(default)]
    pub meta: Option<CollectionMeta>,
    #[serde(default)]
    pub links: Option<CollectionLinks>,
}

impl<A> KitsuCollection<A> {
    pub fn total_count(&self) -> Option<u32> {
        self.meta.as_ref().and_then(|m| m.count)
    }

    pub fn has_next_page(&self) -> bool {
        self.links
            .as_ref()
            .and_then(|l| l.next.as_ref())
            .is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitsuSingle<A> {
    pub data: KitsuResource<A>,
    #[serde(default)]
    pub included: Vec<IncludedResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CollectionMeta {
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CollectionLinks {
    #[serde(default)]
    pub next: Option<String>,
}

// Relationships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<RelationshipData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Relationship {
    /// Target of a to-one relationship
    pub fn single(&self) -> Option<&ResourceIdentifier> {
        match self.data.as_ref()? {
            RelationshipData::One(identifier) => Some(identifier),
            RelationshipData::Many(_) => None,
        }
    }

    pub fn many(&self) -> &[ResourceIdentifier] {
        match &self.data {
            Some(RelationshipData::Many(identifiers)) => identifiers,
            _ => &[],
        }
    }
}

/// Sideloaded resource; attributes depend on `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncludedResource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: IncludedAttributes,
    #[serde(default)]
    pub relationships: BTreeMap<String, Relationship>,
}

/// Union of the attributes used from `mediaCharacters`, `characters`,
/// `mediaStaff`, `people` and `reviews`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IncludedAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub canonical_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub image: Option<ImageSet>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

// Attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ImageSet {
    #[serde(default)]
    pub tiny: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

impl ImageSet {
    pub fn best(&self) -> Option<String> {
        self.large
            .clone()
            .or_else(|| self.original.clone())
            .or_else(|| self.medium.clone())
            .or_else(|| self.small.clone())
            .or_else(|| self.tiny.clone())
    }
}

/// Shared by `anime` and `manga` resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttributes {
    #[serde(default)]
    pub canonical_title: Option<String>,
    /// Keyed by locale: "en", "en_jp", "ja_jp", ...
    #[serde(default)]
    pub titles: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub abbreviated_titles: Option<Vec<String>>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>, // "current", "finished", "tba", "unreleased", "upcoming"
    /// Percentage as a string, e.g. "82.04"
    #[serde(default)]
    pub average_rating: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>, // "TV", "movie", "manga", "novel", ...
    #[serde(default)]
    pub poster_image: Option<ImageSet>,
    #[serde(default)]
    pub cover_image: Option<ImageSet>,
    #[serde(default)]
    pub episode_count: Option<i64>,
    #[serde(default)]
    pub episode_length: Option<i64>,
    #[serde(default)]
    pub chapter_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeAttributes {
    #[serde(default)]
    pub canonical_title: Option<String>,
    #[serde(default)]
    pub titles: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub season_number: Option<i64>,
    #[serde(default)]
    pub airdate: Option<String>,
    #[serde(default)]
    pub length: Option<i64>,
    #[serde(default)]
    pub thumbnail: Option<ImageSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChapterAttributes {
    #[serde(default)]
    pub canonical_title: Option<String>,
    #[serde(default)]
    pub titles: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub number: Option<f64>,
    #[serde(default)]
    pub volume_number: Option<i64>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<ImageSet>,
}

pub type KitsuMedia = KitsuResource<MediaAttributes>;
pub type KitsuEpisode = KitsuResource<EpisodeAttributes>;
pub type KitsuChapter = KitsuResource<ChapterAttributes>;
