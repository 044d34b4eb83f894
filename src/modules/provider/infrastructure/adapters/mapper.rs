//! Helpers shared by the per-catalog mappers

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::modules::media::MediaEntity;
use crate::shared::errors::AppResult;

static LINE_BREAK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("line break regex should compile"));
static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("html regex should compile"));
static BLANK_LINES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank line regex should compile"));
static SOURCE_NOTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[\(\[]\s*(source|written by)[^\)\]]*[\)\]]\s*$")
        .expect("source note regex should compile")
});

/// Converts catalog DTOs to canonical media entities
pub trait MediaMapper<T> {
    fn map_media(&self, source: T) -> AppResult<MediaEntity>;

    /// Map a list, dropping entries that fail boundary validation
    fn map_media_list(&self, sources: Vec<T>) -> Vec<MediaEntity> {
        sources
            .into_iter()
            .filter_map(|source| match self.map_media(source) {
                Ok(media) => Some(media),
                Err(e) => {
                    log::debug!("Dropping unmappable catalog entry: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Plain-text synopsis from catalog HTML/markdown-ish descriptions
pub fn clean_description(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let text = LINE_BREAK_REGEX.replace_all(raw, "\n");
    let text = HTML_TAG_REGEX.replace_all(&text, "");
    let text = text
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("\r\n", "\n");
    let text = BLANK_LINES_REGEX.replace_all(&text, "\n\n");
    let text = SOURCE_NOTE_REGEX.replace(text.trim(), "");
    let text = text.trim();

    (!text.is_empty()).then(|| text.to_string())
}

/// Accepts `YYYY-MM-DD` and RFC 3339 timestamps
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d").ok()
}

/// Append `title` unless it is blank or already present (case-insensitive)
pub fn push_title(titles: &mut Vec<String>, title: Option<&str>) {
    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        if !titles.iter().any(|t| t.eq_ignore_ascii_case(title)) {
            titles.push(title.to_string());
        }
    }
}

/// Alternative titles excluding the main one
pub fn alternative_titles<'a, I>(main: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut titles = vec![main.to_string()];
    for candidate in candidates {
        push_title(&mut titles, candidate);
    }
    titles.remove(0);
    titles
}

/// Non-negative count, treating 0 as unknown
pub fn positive_count(value: Option<i64>) -> Option<u32> {
    value.filter(|v| *v > 0).and_then(|v| u32::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_description_strips_html() {
        let cleaned = clean_description(Some(
            "Naruto Uzumaki<br><br>wants to be <i>Hokage</i>.<br>\n(Source: Crunchyroll)",
        ))
        .unwrap();
        assert!(!cleaned.contains('<'));
        assert!(cleaned.starts_with("Naruto Uzumaki"));
        assert!(cleaned.contains("wants to be Hokage."));
        assert!(!cleaned.contains("Source"));
    }

    #[test]
    fn test_clean_description_empty() {
        assert_eq!(clean_description(Some("<br>")), None);
        assert_eq!(clean_description(None), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2002, 10, 3);
        assert_eq!(parse_date(Some("2002-10-03")), expected);
        assert_eq!(parse_date(Some("2002-10-03T00:00:00+00:00")), expected);
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(Some("unknown")), None);
    }

    #[test]
    fn test_alternative_titles_dedupe() {
        let alts = alternative_titles(
            "Naruto",
            [Some("NARUTO"), Some("ナルト"), None, Some(" "), Some("ナルト")],
        );
        assert_eq!(alts, vec!["ナルト".to_string()]);
    }

    #[test]
    fn test_positive_count() {
        assert_eq!(positive_count(Some(220)), Some(220));
        assert_eq!(positive_count(Some(0)), None);
        assert_eq!(positive_count(Some(-1)), None);
        assert_eq!(positive_count(None), None);
    }
}
