/// Test data factories using builder pattern
///
/// Provides convenient methods to create test data with sensible defaults
use chrono::NaiveDate;
use kizuna::modules::media::{ChapterEntity, EpisodeEntity, MediaEntity};
use kizuna::{MediaType, ProviderId};

pub struct MediaFactory {
    id: String,
    title: String,
    alternative_titles: Vec<String>,
    media_type: MediaType,
    provider: ProviderId,
    year: Option<i32>,
    episodes: Option<u32>,
    chapters: Option<u32>,
    cover_image: Option<String>,
    banner_image: Option<String>,
}

impl Default for MediaFactory {
    fn default() -> Self {
        Self {
            id: format!("{}", rand::random::<u32>() % 1000000 + 1000),
            title: "Test Anime".to_string(),
            alternative_titles: Vec::new(),
            media_type: MediaType::Anime,
            provider: ProviderId::AniList,
            year: None,
            episodes: None,
            chapters: None,
            cover_image: None,
            banner_image: None,
        }
    }
}

impl MediaFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Naruto (2002, 220 episodes) as a given catalog reports it
    pub fn naruto(provider: ProviderId, id: &str) -> Self {
        Self::new()
            .with_provider(provider, id)
            .with_title("Naruto")
            .with_year(2002)
            .with_episodes(220)
    }

    /// Berserk manga as a given catalog reports it
    pub fn berserk(provider: ProviderId, id: &str) -> Self {
        Self::new()
            .with_provider(provider, id)
            .with_title("Berserk")
            .with_type(MediaType::Manga)
            .with_year(1989)
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_alternative_titles(mut self, titles: Vec<&str>) -> Self {
        self.alternative_titles = titles.into_iter().map(str::to_string).collect();
        self
    }

    pub fn with_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    pub fn with_provider(mut self, provider: ProviderId, id: &str) -> Self {
        self.provider = provider;
        self.id = id.to_string();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_episodes(mut self, episodes: u32) -> Self {
        self.episodes = Some(episodes);
        self
    }

    pub fn without_episodes(mut self) -> Self {
        self.episodes = None;
        self
    }

    pub fn with_chapters(mut self, chapters: u32) -> Self {
        self.chapters = Some(chapters);
        self
    }

    pub fn with_cover(mut self, url: &str) -> Self {
        self.cover_image = Some(url.to_string());
        self
    }

    pub fn with_banner(mut self, url: &str) -> Self {
        self.banner_image = Some(url.to_string());
        self
    }

    pub fn build(self) -> MediaEntity {
        let mut media = MediaEntity::new(self.id, self.title, self.media_type, self.provider);
        media.alternative_titles = self.alternative_titles;
        media.start_date = self.year.and_then(|y| NaiveDate::from_ymd_opt(y, 4, 1));
        media.total_episodes = self.episodes;
        media.total_chapters = self.chapters;
        media.cover_image = self.cover_image;
        media.banner_image = self.banner_image;
        media
    }
}

/// `count` consecutive episodes numbered from 1
pub fn episodes(provider: ProviderId, media_id: &str, count: u32) -> Vec<EpisodeEntity> {
    (1..=count)
        .map(|n| EpisodeEntity::new(media_id, n, format!("{} episode {}", provider, n), provider))
        .collect()
}

/// `count` consecutive real chapters numbered from 1
pub fn chapters(provider: ProviderId, media_id: &str, count: u32) -> Vec<ChapterEntity> {
    (1..=count)
        .map(|n| ChapterEntity::new(media_id, n as f64, format!("Chapter {}", n), provider))
        .collect()
}
