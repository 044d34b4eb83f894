use std::collections::BTreeMap;

use super::models::*;
use crate::modules::media::{
    ChapterEntity, CharacterEntity, EpisodeEntity, MediaDetailsEntity, MediaEntity, MediaStatus,
    ReviewEntity, StaffEntity,
};
use crate::modules::provider::infrastructure::adapters::mapper::{
    alternative_titles, clean_description, parse_date, positive_count, MediaMapper,
};
use crate::shared::domain::{MediaType, ProviderId};
use crate::shared::errors::{AppError, AppResult};

/// Locale preference when a Kitsu resource carries several titles
const TITLE_LOCALES: &[&str] = &["en", "en_us", "en_jp", "ja_jp"];

/// Kitsu specific mapper implementation
#[derive(Debug, Clone, Default)]
pub struct KitsuMapper;

impl KitsuMapper {
    pub fn new() -> Self {
        Self
    }

    fn map_media_type(kind: &str, subtype: Option<&str>) -> MediaType {
        let subtype = subtype.map(str::to_lowercase);
        match (kind, subtype.as_deref()) {
            ("manga", Some("novel")) => MediaType::Novel,
            ("manga", _) => MediaType::Manga,
            ("anime", Some("movie")) => MediaType::Movie,
            _ => MediaType::Anime,
        }
    }

    fn localized_title(titles: &BTreeMap<String, Option<String>>) -> Option<&str> {
        TITLE_LOCALES
            .iter()
            .filter_map(|locale| titles.get(*locale)?.as_deref())
            .map(str::trim)
            .find(|t| !t.is_empty())
    }

    /// Kitsu's average rating is a percentage string
    fn parse_rating(raw: Option<&str>) -> Option<f64> {
        raw?.trim().parse::<f64>().ok().map(|r| r / 10.0)
    }

    fn entry_title(
        canonical: Option<&str>,
        titles: &BTreeMap<String, Option<String>>,
    ) -> Option<String> {
        canonical
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| Self::localized_title(titles))
            .map(str::to_string)
    }

    pub fn map_episode(
        &self,
        media_id: &str,
        episode: KitsuEpisode,
        cover_image_hint: Option<&str>,
    ) -> Option<EpisodeEntity> {
        let attributes = episode.attributes;
        let number = positive_count(attributes.number)?;
        let title = Self::entry_title(attributes.canonical_title.as_deref(), &attributes.titles)
            .unwrap_or_else(|| format!("Episode {}", number));

        let mut entity = EpisodeEntity::new(media_id, number, title, ProviderId::Kitsu);
        entity.season_number = positive_count(attributes.season_number);
        entity.release_date = parse_date(attributes.airdate.as_deref());
        entity.duration = positive_count(attributes.length);
        entity.thumbnail = attributes
            .thumbnail
            .as_ref()
            .and_then(ImageSet::best)
            .or_else(|| cover_image_hint.map(str::to_string));
        Some(entity)
    }

    pub fn map_episodes(
        &self,
        media_id: &str,
        episodes: Vec<KitsuEpisode>,
        cover_image_hint: Option<&str>,
    ) -> Vec<EpisodeEntity> {
        episodes
            .into_iter()
            .filter_map(|e| self.map_episode(media_id, e, cover_image_hint))
            .collect()
    }

    pub fn map_chapter(&self, media_id: &str, chapter: KitsuChapter) -> Option<ChapterEntity> {
        let attributes = chapter.attributes;
        let number = attributes.number.filter(|n| *n > 0.0)?;
        let title = Self::entry_title(attributes.canonical_title.as_deref(), &attributes.titles)
            .unwrap_or_else(|| format!("Chapter {}", number));

        let mut entity = ChapterEntity::new(media_id, number, title, ProviderId::Kitsu);
        entity.release_date = parse_date(attributes.published.as_deref());
        entity.thumbnail = attributes.thumbnail.as_ref().and_then(ImageSet::best);
        Some(entity)
    }

    pub fn map_chapters(&self, media_id: &str, chapters: Vec<KitsuChapter>) -> Vec<ChapterEntity> {
        chapters
            .into_iter()
            .filter_map(|c| self.map_chapter(media_id, c))
            .collect()
    }

    /// Resolve a to-one relationship against the sideloaded resources
    fn linked<'a>(
        included: &'a [IncludedResource],
        resource: &IncludedResource,
        relation: &str,
    ) -> Option<&'a IncludedResource> {
        let target = resource.relationships.get(relation)?.single()?;
        included
            .iter()
            .find(|r| r.kind == target.kind && r.id == target.id)
    }

    /// Details plus the sideloaded characters, staff and reviews
    pub fn map_details(&self, response: KitsuSingle<MediaAttributes>) -> AppResult<MediaDetailsEntity> {
        let description = clean_description(response.data.attributes.synopsis.as_deref());
        let included = response.included.as_slice();

        let mut characters = Vec::new();
        let mut staff = Vec::new();
        let mut reviews = Vec::new();

        for resource in included {
            match resource.kind.as_str() {
                "mediaCharacters" => {
                    let Some(character) = Self::linked(included, resource, "character") else {
                        continue;
                    };
                    let name = character
                        .attributes
                        .canonical_name
                        .clone()
                        .or_else(|| character.attributes.name.clone());
                    if let Some(name) = name {
                        characters.push(CharacterEntity {
                            name,
                            role: resource.attributes.role.clone().unwrap_or_default(),
                            image: character.attributes.image.as_ref().and_then(ImageSet::best),
                        });
                    }
                }
                "mediaStaff" => {
                    let person = Self::linked(included, resource, "person");
                    if let Some(name) = person.and_then(|p| p.attributes.name.clone()) {
                        staff.push(StaffEntity {
                            name,
                            role: resource.attributes.role.clone().unwrap_or_default(),
                        });
                    }
                }
                "reviews" => {
                    if let Some(content) = resource.attributes.content.as_deref() {
                        reviews.push(ReviewEntity {
                            summary: content.chars().take(500).collect(),
                            // Kitsu rates reviews out of 20
                            score: resource.attributes.rating.map(|r| r / 2.0),
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(MediaDetailsEntity {
            media: self.map_media(response.data)?,
            description,
            characters,
            staff,
            reviews,
        })
    }
}

impl MediaMapper<KitsuMedia> for KitsuMapper {
    fn map_media(&self, media: KitsuMedia) -> AppResult<MediaEntity> {
        let attributes = media.attributes;
        let title = Self::localized_title(&attributes.titles)
            .or(attributes.canonical_title.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::SerializationError(format!("Kitsu entry {} has no title", media.id)))?
            .to_string();

        let mut candidates: Vec<Option<&str>> = vec![attributes.canonical_title.as_deref()];
        candidates.extend(attributes.titles.values().map(|t| t.as_deref()));
        if let Some(abbreviated) = &attributes.abbreviated_titles {
            candidates.extend(abbreviated.iter().map(|t| Some(t.as_str())));
        }
        let alternative_titles = alternative_titles(&title, candidates);

        let mut entity = MediaEntity::new(
            media.id,
            title,
            Self::map_media_type(&media.kind, attributes.subtype.as_deref()),
            ProviderId::Kitsu,
        );
        entity.alternative_titles = alternative_titles;
        entity.cover_image = attributes.poster_image.as_ref().and_then(ImageSet::best);
        entity.banner_image = attributes.cover_image.as_ref().and_then(ImageSet::best);
        entity.total_episodes = positive_count(attributes.episode_count);
        entity.total_chapters = positive_count(attributes.chapter_count);
        entity.start_date = parse_date(attributes.start_date.as_deref());
        entity.status = attributes
            .status
            .as_deref()
            .map(MediaStatus::from)
            .unwrap_or_default();
        entity.rating = Self::parse_rating(attributes.average_rating.as_deref());

        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource<A>(id: &str, kind: &str, attributes: A) -> KitsuResource<A> {
        KitsuResource {
            id: id.to_string(),
            kind: kind.to_string(),
            attributes,
            relationships: BTreeMap::new(),
        }
    }

    fn naruto() -> KitsuMedia {
        let mut titles = BTreeMap::new();
        titles.insert("en".to_string(), Some("Naruto".to_string()));
        titles.insert("ja_jp".to_string(), Some("ナルト".to_string()));
        titles.insert("en_us".to_string(), None);

        resource(
            "11",
            "anime",
            MediaAttributes {
                canonical_title: Some("Naruto".to_string()),
                titles,
                start_date: Some("2002-10-03".to_string()),
                status: Some("finished".to_string()),
                average_rating: Some("79.8".to_string()),
                subtype: Some("TV".to_string()),
                episode_count: Some(220),
                poster_image: Some(ImageSet {
                    original: Some("poster".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_map_anime() {
        let media = KitsuMapper::new().map_media(naruto()).unwrap();

        assert_eq!(media.id, "11");
        assert_eq!(media.title, "Naruto");
        assert_eq!(media.alternative_titles, vec!["ナルト"]);
        assert_eq!(media.year(), Some(2002));
        assert_eq!(media.total_episodes, Some(220));
        assert_eq!(media.cover_image.as_deref(), Some("poster"));
        assert!(media.banner_image.is_none());
        assert!((media.rating.unwrap() - 7.98).abs() < 1e-9);
    }

    #[test]
    fn test_media_types() {
        assert_eq!(KitsuMapper::map_media_type("manga", Some("novel")), MediaType::Novel);
        assert_eq!(KitsuMapper::map_media_type("manga", Some("manhwa")), MediaType::Manga);
        assert_eq!(KitsuMapper::map_media_type("anime", Some("movie")), MediaType::Movie);
        assert_eq!(KitsuMapper::map_media_type("anime", Some("OVA")), MediaType::Anime);
    }

    #[test]
    fn test_episode_without_number_is_skipped() {
        let mapper = KitsuMapper::new();
        let episodes = vec![
            resource("1", "episodes", EpisodeAttributes {
                number: Some(1),
                canonical_title: Some("Enter: Naruto Uzumaki!".to_string()),
                ..Default::default()
            }),
            resource("2", "episodes", EpisodeAttributes::default()),
        ];

        let mapped = mapper.map_episodes("11", episodes, Some("cover"));
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].title, "Enter: Naruto Uzumaki!");
        assert_eq!(mapped[0].thumbnail.as_deref(), Some("cover"));
    }

    #[test]
    fn test_fractional_chapter() {
        let chapter = resource("9", "chapters", ChapterAttributes {
            number: Some(10.5),
            ..Default::default()
        });

        let mapped = KitsuMapper::new().map_chapter("42", chapter).unwrap();
        assert_eq!(mapped.number, 10.5);
        assert_eq!(mapped.title, "Chapter 10.5");
        assert!(!mapped.is_placeholder);
    }

    #[test]
    fn test_details_resolve_sideloaded_characters() {
        let json = r#"{
            "data": {"id": "11", "type": "anime", "attributes": {"canonicalTitle": "Naruto", "synopsis": "Ninja."}},
            "included": [
                {"id": "100", "type": "mediaCharacters", "attributes": {"role": "main"},
                 "relationships": {"character": {"data": {"id": "7", "type": "characters"}}}},
                {"id": "7", "type": "characters", "attributes": {"canonicalName": "Naruto Uzumaki"}},
                {"id": "200", "type": "mediaStaff", "attributes": {"role": "Director"},
                 "relationships": {"person": {"data": {"id": "3", "type": "people"}}}},
                {"id": "3", "type": "people", "attributes": {"name": "Hayato Date"}}
            ]
        }"#;
        let response: KitsuSingle<MediaAttributes> = serde_json::from_str(json).unwrap();

        let details = KitsuMapper::new().map_details(response).unwrap();
        assert_eq!(details.description.as_deref(), Some("Ninja."));
        assert_eq!(details.characters.len(), 1);
        assert_eq!(details.characters[0].name, "Naruto Uzumaki");
        assert_eq!(details.characters[0].role, "main");
        assert_eq!(details.staff[0].name, "Hayato Date");
    }
}
