use std::collections::HashSet;
use std::sync::LazyLock;

/// Transformation that can be applied to a title
///
/// Each transformation is composable and testable in isolation.
pub trait TitleTransformation: Send + Sync {
    fn transform(&self, title: &str) -> String;
    fn name(&self) -> &'static str;
}

/// Converts title to lowercase
#[derive(Debug, Clone)]
pub struct LowercaseTransform;

impl TitleTransformation for LowercaseTransform {
    fn transform(&self, title: &str) -> String {
        title.to_lowercase()
    }

    fn name(&self) -> &'static str {
        "Lowercase"
    }
}

/// Folds accented Latin letters to their base letter ("Pokémon" -> "Pokemon")
#[derive(Debug, Clone)]
pub struct StripDiacriticsTransform;

impl StripDiacriticsTransform {
    fn fold(c: char) -> Option<&'static str> {
        let folded = match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
            'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
            'ç' | 'ć' | 'č' => "c",
            'Ç' | 'Ć' | 'Č' => "C",
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
            'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => "E",
            'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
            'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' => "I",
            'ñ' | 'ń' | 'ň' => "n",
            'Ñ' | 'Ń' | 'Ň' => "N",
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
            'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ő' => "O",
            'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
            'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' | 'Ű' => "U",
            'ý' | 'ÿ' => "y",
            'Ý' | 'Ÿ' => "Y",
            'ś' | 'š' => "s",
            'Ś' | 'Š' => "S",
            'ź' | 'ż' | 'ž' => "z",
            'Ź' | 'Ż' | 'Ž' => "Z",
            'ł' => "l",
            'Ł' => "L",
            'ß' => "ss",
            'æ' => "ae",
            'Æ' => "AE",
            'œ' => "oe",
            'Œ' => "OE",
            _ => return None,
        };
        Some(folded)
    }
}

impl TitleTransformation for StripDiacriticsTransform {
    fn transform(&self, title: &str) -> String {
        let mut result = String::with_capacity(title.len());
        for c in title.chars() {
            match Self::fold(c) {
                Some(folded) => result.push_str(folded),
                None => result.push(c),
            }
        }
        result
    }

    fn name(&self) -> &'static str {
        "StripDiacritics"
    }
}

/// Removes specified patterns from the title
#[derive(Debug, Clone)]
pub struct RemovePatternsTransform {
    patterns: Vec<String>,
}

impl RemovePatternsTransform {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }
}

impl TitleTransformation for RemovePatternsTransform {
    fn transform(&self, title: &str) -> String {
        let mut result = title.to_string();
        for pattern in &self.patterns {
            result = result.replace(pattern, " ");
        }
        result
    }

    fn name(&self) -> &'static str {
        "RemovePatterns"
    }
}

/// Replaces punctuation with spaces, keeping letters, digits and whitespace.
///
/// "Re:Zero" becomes "Re Zero" so word boundaries survive for token overlap.
#[derive(Debug, Clone)]
pub struct RemoveSpecialCharsTransform;

impl TitleTransformation for RemoveSpecialCharsTransform {
    fn transform(&self, title: &str) -> String {
        title
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "RemoveSpecialChars"
    }
}

/// Normalizes whitespace (collapses multiple spaces, trims)
#[derive(Debug, Clone)]
pub struct NormalizeWhitespaceTransform;

impl TitleTransformation for NormalizeWhitespaceTransform {
    fn transform(&self, title: &str) -> String {
        title.split_whitespace().collect::<Vec<&str>>().join(" ")
    }

    fn name(&self) -> &'static str {
        "NormalizeWhitespace"
    }
}

/// Removes stop words and short words
#[derive(Debug, Clone)]
pub struct RemoveStopWordsTransform {
    stop_words: HashSet<String>,
    min_word_length: usize,
}

impl RemoveStopWordsTransform {
    pub fn new(stop_words: Vec<String>, min_word_length: usize) -> Self {
        Self {
            stop_words: stop_words.into_iter().collect(),
            min_word_length,
        }
    }
}

impl TitleTransformation for RemoveStopWordsTransform {
    fn transform(&self, title: &str) -> String {
        title
            .split_whitespace()
            .filter(|word| {
                !self.stop_words.contains(&word.to_lowercase())
                    && word.chars().count() >= self.min_word_length
            })
            .collect::<Vec<&str>>()
            .join(" ")
    }

    fn name(&self) -> &'static str {
        "RemoveStopWords"
    }
}

/// Title normalizer that applies a pipeline of transformations
///
/// Uses the builder pattern for composability and testability.
pub struct TitleNormalizer {
    transformations: Vec<Box<dyn TitleTransformation>>,
}

static MATCH_KEY_NORMALIZER: LazyLock<TitleNormalizer> =
    LazyLock::new(TitleNormalizer::match_key_pipeline);

/// Normalised form used for cache keys and similarity scoring
pub fn normalize_title(title: &str) -> String {
    MATCH_KEY_NORMALIZER.normalize(title)
}

impl TitleNormalizer {
    /// Create a new empty normalizer
    pub fn new() -> Self {
        Self {
            transformations: Vec::new(),
        }
    }

    /// Lowercase, diacritics and punctuation stripped, whitespace collapsed
    pub fn match_key_pipeline() -> Self {
        Self::new()
            .with_strip_diacritics()
            .with_lowercase()
            .with_remove_special_chars()
            .with_normalize_whitespace()
    }

    /// Add lowercase transformation
    pub fn with_lowercase(mut self) -> Self {
        self.transformations.push(Box::new(LowercaseTransform));
        self
    }

    pub fn with_strip_diacritics(mut self) -> Self {
        self.transformations.push(Box::new(StripDiacriticsTransform));
        self
    }

    /// Add pattern removal transformation
    pub fn with_remove_patterns(mut self, patterns: Vec<String>) -> Self {
        self.transformations
            .push(Box::new(RemovePatternsTransform::new(patterns)));
        self
    }

    /// Add special character removal transformation
    pub fn with_remove_special_chars(mut self) -> Self {
        self.transformations.push(Box::new(RemoveSpecialCharsTransform));
        self
    }

    /// Add whitespace normalization transformation
    pub fn with_normalize_whitespace(mut self) -> Self {
        self.transformations
            .push(Box::new(NormalizeWhitespaceTransform));
        self
    }

    /// Add stop word removal transformation
    pub fn with_remove_stop_words(mut self, stop_words: Vec<String>, min_word_length: usize) -> Self {
        self.transformations
            .push(Box::new(RemoveStopWordsTransform::new(stop_words, min_word_length)));
        self
    }

    /// Apply all transformations to the title
    pub fn normalize(&self, title: &str) -> String {
        let mut result = title.to_string();

        for transformation in &self.transformations {
            result = transformation.transform(&result);
            log::trace!("After {}: '{}'", transformation.name(), result);
        }

        result
    }

    /// Get the number of transformations in the pipeline
    pub fn transformation_count(&self) -> usize {
        self.transformations.len()
    }
}

impl Default for TitleNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
