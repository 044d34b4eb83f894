//! AniList GraphQL queries
//!
//! Every query selects the same media fields so one `Media` model covers
//! search, browse and details responses.

const MEDIA_FIELDS: &str = r#"
fragment mediaFields on Media {
  id
  idMal
  type
  format
  status
  title {
    romaji
    english
    native
  }
  synonyms
  episodes
  chapters
  duration
  genres
  averageScore
  startDate {
    year
    month
    day
  }
  coverImage {
    extraLarge
    large
    medium
  }
  bannerImage
}
"#;

const SEARCH_BODY: &str = r#"
query ($search: String, $page: Int, $perPage: Int, $type: MediaType, $format: [MediaFormat], $seasonYear: Int) {
  Page(page: $page, perPage: $perPage) {
    pageInfo {
      total
      currentPage
      lastPage
      hasNextPage
      perPage
    }
    media(search: $search, type: $type, format_in: $format, seasonYear: $seasonYear, sort: SEARCH_MATCH) {
      ...mediaFields
    }
  }
}
"#;

const BROWSE_BODY: &str = r#"
query ($page: Int, $perPage: Int, $type: MediaType, $format: [MediaFormat], $sort: [MediaSort]) {
  Page(page: $page, perPage: $perPage) {
    pageInfo {
      hasNextPage
    }
    media(type: $type, format_in: $format, sort: $sort, isAdult: false) {
      ...mediaFields
    }
  }
}
"#;

const DETAILS_BODY: &str = r#"
query ($id: Int, $withCharacters: Boolean!, $withStaff: Boolean!, $withReviews: Boolean!) {
  Media(id: $id) {
    ...mediaFields
    description(asHtml: false)
    characters(perPage: 25, sort: [ROLE, RELEVANCE]) @include(if: $withCharacters) {
      edges {
        role
        node {
          name {
            full
          }
          image {
            large
          }
        }
      }
    }
    staff(perPage: 25, sort: [RELEVANCE]) @include(if: $withStaff) {
      edges {
        role
        node {
          name {
            full
          }
        }
      }
    }
    reviews(perPage: 10, sort: [RATING_DESC]) @include(if: $withReviews) {
      nodes {
        summary
        score
      }
    }
  }
}
"#;

const EPISODES_BODY: &str = r#"
query ($id: Int) {
  Media(id: $id) {
    ...mediaFields
    streamingEpisodes {
      title
      thumbnail
      url
      site
    }
  }
}
"#;

fn with_fragment(body: &str) -> String {
    format!("{}{}", body, MEDIA_FIELDS)
}

pub fn search_query() -> String {
    with_fragment(SEARCH_BODY)
}

pub fn browse_query() -> String {
    with_fragment(BROWSE_BODY)
}

pub fn details_query() -> String {
    with_fragment(DETAILS_BODY)
}

pub fn episodes_query() -> String {
    with_fragment(EPISODES_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_carry_fragment() {
        for query in [search_query(), browse_query(), details_query(), episodes_query()] {
            assert!(query.contains("...mediaFields"));
            assert!(query.contains("fragment mediaFields on Media"));
        }
    }
}
