//! Fuzzy matching used by the table search filter.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Case-insensitive fuzzy matcher.
pub struct Matcher {
    inner: SkimMatcherV2,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            inner: SkimMatcherV2::default().ignore_case(),
        }
    }

    /// Match score for ranking, higher is better. `None` when `pattern`
    /// does not match `text`.
    pub fn score(&self, text: &str, pattern: &str) -> Option<i64> {
        self.inner.fuzzy_match(text, pattern)
    }

    /// Best score of `pattern` against any of `texts`.
    pub fn best_score<'a>(
        &self,
        texts: impl IntoIterator<Item = &'a str>,
        pattern: &str,
    ) -> Option<i64> {
        texts
            .into_iter()
            .filter_map(|text| self.score(text, pattern))
            .max()
    }
}
