//! Name similarity
//!
//! Scores compare normalized names (see [`normalize_name`]), so `firstName`,
//! `first_name` and `FIRST-NAME` are all identical.

use crate::names::normalize_name;

/// A similarity score in `0.0..=1.0` between two names
pub trait StringSimilarity {
    /// Score `a` against `b`; 1.0 means identical
    fn similarity(&self, a: &str, b: &str) -> f64;
}

impl<F> StringSimilarity for F
where
    F: Fn(&str, &str) -> f64,
{
    fn similarity(&self, a: &str, b: &str) -> f64 {
        self(a, b)
    }
}

/// Levenshtein ratio of the normalized names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizedLevenshtein;

impl StringSimilarity for NormalizedLevenshtein {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let (a, b) = (normalize_name(a), normalize_name(b));
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        strsim::normalized_levenshtein(&a, &b)
    }
}

/// The best scoring candidate at or above `threshold`. Ties keep the
/// earliest candidate.
pub fn best_match<'c, S, I>(
    similarity: &S,
    name: &str,
    candidates: I,
    threshold: f64,
) -> Option<(&'c str, f64)>
where
    S: StringSimilarity + ?Sized,
    I: IntoIterator<Item = &'c str>,
{
    let mut best: Option<(&'c str, f64)> = None;
    for candidate in candidates {
        let score = similarity.similarity(name, candidate);
        if score < threshold {
            continue;
        }
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalized_names_are_identical() {
        let sim = NormalizedLevenshtein;
        assert_eq!(sim.similarity("firstName", "first_name"), 1.0);
        assert_eq!(sim.similarity("FIRST-NAME", "firstName"), 1.0);
        assert_eq!(sim.similarity("", "firstName"), 0.0);
        assert_eq!(sim.similarity("123", "456"), 0.0);
    }

    #[test]
    fn test_close_names_score_high() {
        let sim = NormalizedLevenshtein;
        assert!(sim.similarity("lastName", "lastNames") > 0.85);
        assert!(sim.similarity("lastName", "snils") < 0.6);
    }

    #[test]
    fn test_best_match() {
        let sim = NormalizedLevenshtein;
        let keys = ["snils", "birthDate", "birth_date", "lastName"];
        let (key, score) = best_match(&sim, "BirthDate", keys, 0.6).unwrap();
        // Both birth keys normalize the same; the first one wins
        assert_eq!(key, "birthDate");
        assert_eq!(score, 1.0);
        assert!(best_match(&sim, "passport", keys, 0.6).is_none());
    }

    #[test]
    fn test_form_field_keys_stay_distinct() {
        let sim = NormalizedLevenshtein;
        assert!(sim.similarity("c1", "c12") < 1.0);
        let (key, _) = best_match(&sim, "c12", ["c1", "c12"], 0.6).unwrap();
        assert_eq!(key, "c12");
    }

    #[test]
    fn test_closure_similarity() {
        let exact = |a: &str, b: &str| if a == b { 1.0 } else { 0.0 };
        assert_eq!(best_match(&exact, "a", ["b", "a"], 0.5), Some(("a", 1.0)));
    }

    proptest! {
        #[test]
        fn prop_score_is_pure_over_normalized_names(a in "[a-zA-Z_]{0,12}", b in "[a-zA-Z_]{0,12}") {
            let sim = NormalizedLevenshtein;
            let score = sim.similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score));
            prop_assert_eq!(score, sim.similarity(&normalize_name(&a), &normalize_name(&b)));
        }

        #[test]
        fn prop_threshold_decides_match(a in "[a-z]{1,10}", b in "[a-z]{1,10}", threshold in 0.0f64..=1.0) {
            let sim = NormalizedLevenshtein;
            let score = sim.similarity(&a, &b);
            let found = best_match(&sim, &a, [b.as_str()], threshold);
            prop_assert_eq!(found.is_some(), score >= threshold);
        }
    }
}
