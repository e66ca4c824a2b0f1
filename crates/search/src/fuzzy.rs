use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32String};

/// Fuzzy ranking of token paths using nucleo-matcher
pub struct FuzzyScorer {
    matcher: Matcher,
    pattern: Pattern,
}

impl FuzzyScorer {
    pub fn new(query: &str) -> Self {
        Self {
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
            pattern: Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart),
        }
    }

    /// Best score over the given haystacks; `None` when nothing matches
    pub fn score<'h>(&mut self, haystacks: impl IntoIterator<Item = &'h str>) -> Option<u32> {
        haystacks
            .into_iter()
            .filter_map(|text| {
                let haystack = Utf32String::from(text);
                self.pattern.score(haystack.slice(..), &mut self.matcher)
            })
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closer_path_scores_higher() {
        let mut scorer = FuzzyScorer::new("surface");
        let exact = scorer.score(["semantic.color.surface"]).unwrap();
        let scattered = scorer.score(["semantic.color.s-u-r-f-a-c-e"]).unwrap_or(0);
        assert!(exact > scattered);
    }

    #[test]
    fn test_no_match_is_none() {
        let mut scorer = FuzzyScorer::new("xyz");
        assert_eq!(scorer.score(["primitive.spacing-4"]), None);
    }

    #[test]
    fn test_typo_tolerance() {
        let mut scorer = FuzzyScorer::new("spcing");
        assert!(scorer.score(["primitive.spacing-4"]).is_some());
    }
}
