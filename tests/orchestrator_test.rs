/// End-to-end orchestration over fake catalogs
mod utils;

use std::sync::Arc;

use kizuna::modules::media::MediaDetailsEntity;
use kizuna::shared::errors::AppError;
use kizuna::{
    CancellationToken, MatchQuery, MatchSet, MediaType, PageProvider, PageRequest, ProviderId,
    ProviderMatch,
};
use utils::factories::{chapters, episodes, MediaFactory};
use utils::fakes::{FakeProvider, PRINT_TYPES, SCREEN_TYPES, TV_TYPES};
use utils::helpers::build_engine;

// ============================================================================
// EPISODE PAGES
// ============================================================================

#[tokio::test]
async fn test_aggregated_episode_page_windows_the_full_list() {
    let anilist = Arc::new(
        FakeProvider::new(ProviderId::AniList, SCREEN_TYPES)
            .with_episodes(episodes(ProviderId::AniList, "20", 45)),
    );
    let engine = build_engine(&[anilist]);
    let media = MediaFactory::naruto(ProviderId::AniList, "20").build();
    let cancel = CancellationToken::new();

    let page = engine
        .orchestrator
        .get_episode_page(&PageRequest::aggregated(media.clone()).with_window(20, 20), &cancel)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 20);
    assert_eq!(page.items[0].number, 21);
    assert_eq!(page.next_offset, Some(40));
    assert_eq!(page.provider_id, PageProvider::Aggregated);
    assert_eq!(page.provider_media_id.as_deref(), Some("20"));

    let last = engine
        .orchestrator
        .get_episode_page(&PageRequest::aggregated(media).with_window(40, 20), &cancel)
        .await
        .unwrap();

    assert_eq!(last.items.len(), 5);
    assert_eq!(last.next_offset, None);
}

#[tokio::test]
async fn test_aggregated_episode_page_accepts_large_windows() {
    let anilist = Arc::new(
        FakeProvider::new(ProviderId::AniList, SCREEN_TYPES)
            .with_episodes(episodes(ProviderId::AniList, "20", 220)),
    );
    let engine = build_engine(&[anilist]);
    let media = MediaFactory::naruto(ProviderId::AniList, "20").build();

    let page = engine
        .orchestrator
        .get_episode_page(&PageRequest::aggregated(media).with_window(0, 150), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 150);
    assert_eq!(page.items[149].number, 150);
    assert_eq!(page.next_offset, Some(150));
}

#[tokio::test]
async fn test_jikan_media_pages_from_jikan() {
    let jikan = Arc::new(
        FakeProvider::new(ProviderId::Jikan, SCREEN_TYPES)
            .with_episodes(episodes(ProviderId::Jikan, "20", 220)),
    );
    let engine = build_engine(&[jikan.clone()]);
    let media = MediaFactory::naruto(ProviderId::Jikan, "20").build();

    let page = engine
        .orchestrator
        .get_episode_page(&PageRequest::new(media), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(page.provider_id, PageProvider::Provider(ProviderId::Jikan));
    assert_eq!(page.items.len(), 20);
    assert_eq!(page.next_offset, Some(20));
    assert_eq!(jikan.episode_page_fetches(), 1);
}

#[tokio::test]
async fn test_failing_episode_page_falls_back_to_aggregated() {
    let jikan = Arc::new(
        FakeProvider::new(ProviderId::Jikan, SCREEN_TYPES)
            .with_episodes(episodes(ProviderId::Jikan, "20", 24))
            .with_episode_page_error(AppError::TransientNetwork("502".to_string())),
    );
    let engine = build_engine(&[jikan.clone()]);
    let media = MediaFactory::naruto(ProviderId::Jikan, "20").build();

    let page = engine
        .orchestrator
        .get_episode_page(&PageRequest::new(media), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(page.provider_id, PageProvider::Aggregated);
    assert_eq!(page.items.len(), 20);
    assert_eq!(page.next_offset, Some(20));
    assert_eq!(jikan.episode_page_fetches(), 1);
    assert_eq!(jikan.episode_fetches(), 1);
}

#[tokio::test]
async fn test_auth_required_is_not_swallowed_by_page_fallback() {
    let jikan = Arc::new(
        FakeProvider::new(ProviderId::Jikan, SCREEN_TYPES)
            .with_episodes(episodes(ProviderId::Jikan, "20", 24))
            .with_episode_page_error(AppError::AuthRequired("MyAnimeList".to_string())),
    );
    let engine = build_engine(&[jikan.clone()]);
    let media = MediaFactory::naruto(ProviderId::Jikan, "20").build();

    let result = engine
        .orchestrator
        .get_episode_page(&PageRequest::new(media), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AppError::AuthRequired(_))));
    assert_eq!(jikan.episode_fetches(), 0);
}

#[tokio::test]
async fn test_empty_first_page_falls_back_to_aggregated() {
    let anilist = Arc::new(
        FakeProvider::new(ProviderId::AniList, SCREEN_TYPES)
            .with_episodes(episodes(ProviderId::AniList, "20", 12)),
    );
    let kitsu = Arc::new(
        FakeProvider::new(ProviderId::Kitsu, SCREEN_TYPES)
            .with_episodes(Vec::new())
            .with_episode_paging(),
    );
    let engine = build_engine(&[anilist, kitsu.clone()]);
    let media = MediaFactory::naruto(ProviderId::AniList, "20").build();

    let page = engine
        .orchestrator
        .get_episode_page(
            &PageRequest::new(media).with_provider(ProviderId::Kitsu).with_provider_media_id("11"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(kitsu.episode_page_fetches(), 1);
    assert_eq!(page.provider_id, PageProvider::Aggregated);
    assert_eq!(page.items.len(), 12);
    assert_eq!(page.items[0].source_provider, ProviderId::AniList);
}

#[tokio::test]
async fn test_paging_source_catalog_serves_its_own_pages() {
    let anilist = Arc::new(
        FakeProvider::new(ProviderId::AniList, SCREEN_TYPES)
            .with_episodes(episodes(ProviderId::AniList, "20", 30))
            .with_episode_paging(),
    );
    let kitsu = Arc::new(FakeProvider::new(ProviderId::Kitsu, SCREEN_TYPES));
    let engine = build_engine(&[anilist.clone(), kitsu.clone()]);
    let media = MediaFactory::naruto(ProviderId::AniList, "20").build();

    let page = engine
        .orchestrator
        .get_episode_page(&PageRequest::new(media).with_window(20, 20), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(page.provider_id, PageProvider::Provider(ProviderId::AniList));
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.next_offset, None);
    // no match lookup needed
    assert_eq!(kitsu.searches(), 0);
}

#[tokio::test]
async fn test_matched_catalog_pages_when_source_cannot() {
    let anilist = Arc::new(FakeProvider::new(ProviderId::AniList, SCREEN_TYPES));
    let kitsu = Arc::new(
        FakeProvider::new(ProviderId::Kitsu, SCREEN_TYPES)
            .with_search_results(vec![MediaFactory::naruto(ProviderId::Kitsu, "11").build()])
            .with_episodes(episodes(ProviderId::Kitsu, "11", 220))
            .with_episode_paging(),
    );
    let engine = build_engine(&[anilist, kitsu.clone()]);
    let media = MediaFactory::naruto(ProviderId::AniList, "20").build();

    let page = engine
        .orchestrator
        .get_episode_page(&PageRequest::new(media), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(page.provider_id, PageProvider::Provider(ProviderId::Kitsu));
    assert_eq!(page.provider_media_id.as_deref(), Some("11"));
    assert_eq!(kitsu.searches(), 1);
}

#[tokio::test]
async fn test_invalid_page_window_is_rejected() {
    let engine = build_engine(&[]);
    let media = MediaFactory::naruto(ProviderId::AniList, "20").build();

    let result = engine
        .orchestrator
        .get_episode_page(&PageRequest::new(media).with_window(0, 0), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

// ============================================================================
// CHAPTER PAGES
// ============================================================================

#[tokio::test]
async fn test_chapter_page_without_kitsu_match_is_not_found() {
    let kitsu = Arc::new(FakeProvider::new(ProviderId::Kitsu, PRINT_TYPES));
    let engine = build_engine(&[kitsu.clone()]);
    let media = MediaFactory::berserk(ProviderId::AniList, "30002").build();

    let result = engine
        .orchestrator
        .get_chapter_page(&PageRequest::new(media), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(kitsu.searches(), 1);
}

#[tokio::test]
async fn test_chapter_page_from_matched_kitsu_entry() {
    let kitsu = Arc::new(
        FakeProvider::new(ProviderId::Kitsu, PRINT_TYPES)
            .with_search_results(vec![MediaFactory::berserk(ProviderId::Kitsu, "7").build()])
            .with_chapters(chapters(ProviderId::Kitsu, "7", 364)),
    );
    let engine = build_engine(&[kitsu]);
    let media = MediaFactory::berserk(ProviderId::AniList, "30002").build();

    let page = engine
        .orchestrator
        .get_chapter_page(&PageRequest::new(media).with_window(360, 10), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(page.provider_id, PageProvider::Provider(ProviderId::Kitsu));
    assert_eq!(page.provider_media_id.as_deref(), Some("7"));
    assert_eq!(page.items.len(), 4);
    assert_eq!(page.next_offset, None);
}

#[tokio::test]
async fn test_chapter_page_errors_propagate() {
    let kitsu = Arc::new(
        FakeProvider::new(ProviderId::Kitsu, PRINT_TYPES)
            .with_chapter_error(AppError::RateLimited("429".to_string())),
    );
    let engine = build_engine(&[kitsu]);
    let media = MediaFactory::berserk(ProviderId::AniList, "30002").build();

    let result = engine
        .orchestrator
        .get_chapter_page(
            &PageRequest::new(media).with_provider_media_id("7"),
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(result, Err(AppError::RateLimited(_))));
}

#[tokio::test]
async fn test_aggregated_chapter_page_uses_placeholders() {
    let anilist = Arc::new(FakeProvider::new(ProviderId::AniList, PRINT_TYPES));
    let engine = build_engine(&[anilist]);
    let media = MediaFactory::berserk(ProviderId::AniList, "30002")
        .with_chapters(50)
        .build();

    let page = engine
        .orchestrator
        .get_chapter_page(&PageRequest::aggregated(media).with_window(40, 20), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 10);
    assert!(page.items.iter().all(|c| c.is_placeholder));
    assert_eq!(page.next_offset, None);
}

// ============================================================================
// MATCH RESOLUTION
// ============================================================================

#[tokio::test]
async fn test_anime_always_consults_forced_catalogs() {
    let anilist = Arc::new(
        FakeProvider::new(ProviderId::AniList, SCREEN_TYPES)
            .with_search_results(vec![MediaFactory::naruto(ProviderId::AniList, "20").build()]),
    );
    let engine = build_engine(&[anilist.clone()]);
    let media = MediaFactory::naruto(ProviderId::Jikan, "20").build();
    let query = MatchQuery::from_media(&media);

    // a cached set that predates AniList
    engine.matcher().store_matches(&query, &MatchSet::new()).await;

    let matches = engine
        .orchestrator
        .resolve_matches(&media, &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches.contains(ProviderId::AniList));
    assert_eq!(anilist.searches(), 1);
    let cached = engine.cache.get(&query.cache_key()).await.unwrap();
    assert!(cached.contains(ProviderId::AniList));
}

#[tokio::test]
async fn test_stale_cached_match_is_refreshed() {
    let kitsu = Arc::new(
        FakeProvider::new(ProviderId::Kitsu, SCREEN_TYPES)
            .with_search_results(vec![MediaFactory::naruto(ProviderId::Kitsu, "11").build()]),
    );
    let engine = build_engine(&[kitsu.clone()]);
    let media = MediaFactory::naruto(ProviderId::Jikan, "20").build();
    let query = MatchQuery::from_media(&media);

    let stale = ProviderMatch::from_candidate(
        MediaFactory::naruto(ProviderId::Kitsu, "999").with_year(2015).build(),
        0.9,
    );
    let cached: MatchSet = vec![stale].into_iter().collect();
    engine.matcher().store_matches(&query, &cached).await;

    let matches = engine
        .orchestrator
        .resolve_matches(&media, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(kitsu.searches(), 1);
    assert_eq!(matches.get(ProviderId::Kitsu).unwrap().provider_media_id, "11");
}

#[tokio::test]
async fn test_match_still_stale_after_refresh_is_dropped() {
    let kitsu = Arc::new(FakeProvider::new(ProviderId::Kitsu, SCREEN_TYPES).with_search_results(
        vec![MediaFactory::naruto(ProviderId::Kitsu, "999").with_year(2013).build()],
    ));
    let engine = build_engine(&[kitsu.clone()]);
    let media = MediaFactory::naruto(ProviderId::Jikan, "20").build();
    let query = MatchQuery::from_media(&media);
    let cancel = CancellationToken::new();

    let stale = ProviderMatch::from_candidate(
        MediaFactory::naruto(ProviderId::Kitsu, "998").with_year(2015).build(),
        0.9,
    );
    engine.matcher().store_matches(&query, &vec![stale].into_iter().collect()).await;

    let refreshed = engine.orchestrator.resolve_matches(&media, &cancel).await.unwrap();
    assert!(refreshed.is_empty());
    assert_eq!(kitsu.searches(), 1);

    let cached = engine.cache.get(&query.cache_key()).await.unwrap();
    assert!(cached.is_empty());

    engine.orchestrator.resolve_matches(&media, &cancel).await.unwrap();
    assert_eq!(kitsu.searches(), 1);
}

#[tokio::test]
async fn test_stale_candidate_on_cold_cache_is_searched_once() {
    let kitsu = Arc::new(FakeProvider::new(ProviderId::Kitsu, SCREEN_TYPES).with_search_results(
        vec![MediaFactory::naruto(ProviderId::Kitsu, "999").with_year(2014).build()],
    ));
    let engine = build_engine(&[kitsu.clone()]);
    let media = MediaFactory::naruto(ProviderId::Jikan, "20").build();
    let cancel = CancellationToken::new();

    let matches = engine.orchestrator.resolve_matches(&media, &cancel).await.unwrap();

    assert!(matches.is_empty());
    assert_eq!(kitsu.searches(), 1);
}

#[tokio::test]
async fn test_forced_catalog_miss_is_remembered() {
    let anilist = Arc::new(FakeProvider::new(ProviderId::AniList, SCREEN_TYPES));
    let engine = build_engine(&[anilist.clone()]);
    let media = MediaFactory::naruto(ProviderId::Jikan, "20").build();
    let cancel = CancellationToken::new();

    for _ in 0..3 {
        let matches = engine.orchestrator.resolve_matches(&media, &cancel).await.unwrap();
        assert!(matches.is_empty());
    }

    assert_eq!(anilist.searches(), 1);
}

#[tokio::test]
async fn test_forced_miss_on_older_cached_set_is_stored() {
    let anilist = Arc::new(FakeProvider::new(ProviderId::AniList, SCREEN_TYPES));
    let engine = build_engine(&[anilist.clone()]);
    let media = MediaFactory::naruto(ProviderId::Jikan, "20").build();
    let query = MatchQuery::from_media(&media);
    let cancel = CancellationToken::new();

    engine.matcher().store_matches(&query, &MatchSet::new()).await;

    engine.orchestrator.resolve_matches(&media, &cancel).await.unwrap();
    engine.orchestrator.resolve_matches(&media, &cancel).await.unwrap();

    assert_eq!(anilist.searches(), 1);
    let cached = engine.cache.get(&query.cache_key()).await.unwrap();
    assert!(cached.was_searched(ProviderId::AniList));
}

#[tokio::test]
async fn test_stale_forced_match_is_not_added() {
    let tmdb = Arc::new(FakeProvider::new(ProviderId::Tmdb, TV_TYPES).with_search_results(vec![
        MediaFactory::naruto(ProviderId::Tmdb, "46260")
            .with_type(MediaType::TvShow)
            .with_year(2013)
            .build(),
    ]));
    let engine = build_engine(&[tmdb.clone()]);
    let media = MediaFactory::naruto(ProviderId::Jikan, "20").build();
    let query = MatchQuery::from_media(&media);
    let cancel = CancellationToken::new();

    engine.matcher().store_matches(&query, &MatchSet::new()).await;

    let matches = engine.orchestrator.resolve_matches(&media, &cancel).await.unwrap();
    engine.orchestrator.resolve_matches(&media, &cancel).await.unwrap();

    assert!(!matches.contains(ProviderId::Tmdb));
    assert_eq!(tmdb.searches(), 1);
}

// ============================================================================
// DETAILS
// ============================================================================

#[tokio::test]
async fn test_details_borrow_artwork_from_tmdb() {
    let bare = MediaFactory::naruto(ProviderId::AniList, "20").build();
    let anilist = Arc::new(
        FakeProvider::new(ProviderId::AniList, SCREEN_TYPES)
            .with_details(MediaDetailsEntity::from_media(bare)),
    );
    let tmdb = Arc::new(FakeProvider::new(ProviderId::Tmdb, TV_TYPES).with_search_results(vec![
        MediaFactory::naruto(ProviderId::Tmdb, "46260")
            .with_type(MediaType::TvShow)
            .with_cover("https://image.tmdb.org/t/p/original/cover.jpg")
            .with_banner("https://image.tmdb.org/t/p/original/banner.jpg")
            .build(),
    ]));
    let engine = build_engine(&[anilist, tmdb.clone()]);

    let details = engine
        .orchestrator
        .get_media_details("20", ProviderId::AniList, MediaType::Anime, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        details.media.cover_image.as_deref(),
        Some("https://image.tmdb.org/t/p/original/cover.jpg")
    );
    assert_eq!(
        details.media.banner_image.as_deref(),
        Some("https://image.tmdb.org/t/p/original/banner.jpg")
    );
    assert_eq!(tmdb.searches(), 1);
}

#[tokio::test]
async fn test_backfill_never_overwrites_existing_artwork() {
    let with_cover = MediaFactory::naruto(ProviderId::AniList, "20")
        .with_cover("https://anilist.co/cover.jpg")
        .build();
    let anilist = Arc::new(
        FakeProvider::new(ProviderId::AniList, SCREEN_TYPES)
            .with_details(MediaDetailsEntity::from_media(with_cover)),
    );
    let tmdb = Arc::new(FakeProvider::new(ProviderId::Tmdb, TV_TYPES).with_search_results(vec![
        MediaFactory::naruto(ProviderId::Tmdb, "46260")
            .with_type(MediaType::TvShow)
            .with_cover("https://tmdb/cover.jpg")
            .with_banner("https://tmdb/banner.jpg")
            .build(),
    ]));
    let engine = build_engine(&[anilist, tmdb]);

    let details = engine
        .orchestrator
        .get_media_details("20", ProviderId::AniList, MediaType::Anime, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(details.media.cover_image.as_deref(), Some("https://anilist.co/cover.jpg"));
    assert_eq!(details.media.banner_image.as_deref(), Some("https://tmdb/banner.jpg"));
}

#[tokio::test]
async fn test_weak_donor_match_leaves_artwork_empty() {
    let bare = MediaFactory::naruto(ProviderId::AniList, "20").build();
    let anilist = Arc::new(
        FakeProvider::new(ProviderId::AniList, SCREEN_TYPES)
            .with_details(MediaDetailsEntity::from_media(bare)),
    );
    let tmdb = Arc::new(FakeProvider::new(ProviderId::Tmdb, TV_TYPES).with_search_results(vec![
        MediaFactory::new()
            .with_provider(ProviderId::Tmdb, "1")
            .with_title("Boruto: Naruto Next Generations")
            .with_type(MediaType::TvShow)
            .with_year(2017)
            .with_cover("https://tmdb/boruto.jpg")
            .build(),
    ]));
    let engine = build_engine(&[anilist, tmdb]);

    let details = engine
        .orchestrator
        .get_media_details("20", ProviderId::AniList, MediaType::Anime, &CancellationToken::new())
        .await
        .unwrap();

    assert!(details.media.cover_image.is_none());
}

#[tokio::test]
async fn test_details_from_unknown_id_is_not_found() {
    let anilist = Arc::new(FakeProvider::new(ProviderId::AniList, SCREEN_TYPES));
    let engine = build_engine(&[anilist]);

    let result = engine
        .orchestrator
        .get_media_details("404", ProviderId::AniList, MediaType::Anime, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

// ============================================================================
// CATALOG BROWSING
// ============================================================================

#[tokio::test]
async fn test_blank_search_query_is_rejected() {
    let anilist = Arc::new(FakeProvider::new(ProviderId::AniList, SCREEN_TYPES));
    let engine = build_engine(&[anilist.clone()]);

    let result = engine
        .orchestrator
        .search(ProviderId::AniList, "   ", MediaType::Anime, 1, None, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    assert_eq!(anilist.searches(), 0);
}

#[tokio::test]
async fn test_search_clamps_page_to_one() {
    let anilist = Arc::new(
        FakeProvider::new(ProviderId::AniList, SCREEN_TYPES)
            .with_search_results(vec![MediaFactory::naruto(ProviderId::AniList, "20").build()]),
    );
    let engine = build_engine(&[anilist]);

    let page = engine
        .orchestrator
        .search(ProviderId::AniList, "naruto", MediaType::Anime, 0, None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(page.current_page, 1);
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn test_unconfigured_catalog_is_unavailable() {
    let engine = build_engine(&[]);

    let result = engine
        .orchestrator
        .search(ProviderId::Simkl, "naruto", MediaType::Anime, 1, None, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AppError::DataUnavailable(_))));
}

#[tokio::test]
async fn test_trending_not_offered_by_catalog() {
    let anilist = Arc::new(FakeProvider::new(ProviderId::AniList, SCREEN_TYPES));
    let engine = build_engine(&[anilist]);

    let result = engine
        .orchestrator
        .trending(ProviderId::AniList, MediaType::Anime, 1, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AppError::NotImplemented(_))));
}
