// src/pipeline/ranker.rs

//! Final ordering of scored postings.

use crate::models::MatchResult;

/// Sort by score descending and keep the best `top_k`.
///
/// The sort is stable, so equal scores keep discovery order.
pub fn rank(mut results: Vec<MatchResult>, top_k: usize) -> Vec<MatchResult> {
    results.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    results.truncate(top_k);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CanonicalLocation, MatchBreakdown, NormalizedPosting, Posting, SourceKind,
    };

    fn result(id: &str, score: f64) -> MatchResult {
        MatchResult {
            id: id.to_string(),
            posting: NormalizedPosting {
                posting: Posting::new(SourceKind::PNet, id, "Acme"),
                salary_value: 0.0,
                canonical_location: CanonicalLocation::default(),
                posted_on: None,
            },
            match_score: score,
            match_breakdown: MatchBreakdown::default(),
        }
    }

    fn ids(results: &[MatchResult]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn sorts_descending() {
        let ranked = rank(vec![result("a", 40.0), result("b", 90.5), result("c", 61.25)], 50);
        assert_eq!(ids(&ranked), vec!["b", "c", "a"]);
    }

    #[test]
    fn ties_keep_discovery_order() {
        let ranked = rank(
            vec![
                result("first", 70.0),
                result("high", 80.0),
                result("second", 70.0),
                result("third", 70.0),
            ],
            50,
        );
        assert_eq!(ids(&ranked), vec!["high", "first", "second", "third"]);
    }

    #[test]
    fn truncates_to_top_k() {
        let results = (0..60).map(|i| result(&i.to_string(), f64::from(i))).collect();
        let ranked = rank(results, 50);
        assert_eq!(ranked.len(), 50);
        assert_eq!(ranked[0].id, "59");
        assert_eq!(ranked[49].id, "10");
    }
}
