use std::cmp::Ordering;

use crate::core::scoring::MatchScorer;
use crate::models::{Candidate, Property, ScoreBreakdown, UserSignalBundle};

/// Result of ranking a candidate pool
#[derive(Debug)]
pub struct RankedResult {
    pub candidates: Vec<Candidate>,
    pub total_candidates: usize,
    /// Catalog order was kept because the user had no signals
    pub fallback: bool,
}

/// Scores and orders a candidate pool for one user
///
/// # Pipeline Stages
/// 1. Drop unlisted properties and duplicates the accessor may return
/// 2. Score each candidate against the user's signals
/// 3. Sort by score, descending; ties keep the accessor's order
/// 4. Truncate to the requested count
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker {
    scorer: MatchScorer,
}

impl Ranker {
    pub fn new(scorer: MatchScorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &MatchScorer {
        &self.scorer
    }

    /// Rank candidates for a user
    ///
    /// # Arguments
    /// * `signals` - The user's signal bundle, already restricted to the enabled sources
    /// * `candidates` - Candidate pool, in catalog order
    /// * `limit` - Maximum number of results to return
    pub fn rank(&self, signals: &UserSignalBundle, candidates: Vec<Property>, limit: usize) -> RankedResult {
        let total_candidates = candidates.len();
        let pool = listed_unique(candidates);

        if signals.is_empty() {
            return RankedResult {
                candidates: catalog_order(pool, limit),
                total_candidates,
                fallback: true,
            };
        }

        let mut scored: Vec<Candidate> = pool
            .into_iter()
            .map(|property| {
                let result = self.scorer.score(&property, signals);
                Candidate {
                    property,
                    match_score: result.score,
                    score_breakdown: result.breakdown,
                }
            })
            .collect();

        // sort_by is stable, so equal scores keep catalog order
        scored.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(Ordering::Equal)
        });
        scored.truncate(limit);

        tracing::debug!(
            "Ranked {} of {} candidates for user {}",
            scored.len(),
            total_candidates,
            signals.user_id
        );

        RankedResult {
            candidates: scored,
            total_candidates,
            fallback: false,
        }
    }
}

/// Unscored candidates in the order the catalog returned them
pub fn catalog_order(pool: Vec<Property>, limit: usize) -> Vec<Candidate> {
    pool.into_iter()
        .take(limit)
        .map(|property| Candidate {
            property,
            match_score: 0.0,
            score_breakdown: ScoreBreakdown::default(),
        })
        .collect()
}

fn listed_unique(candidates: Vec<Property>) -> Vec<Property> {
    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .filter(|property| property.is_listed())
        .filter(|property| seen.insert(property.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PropertyStatus, TravelProfile};

    fn create_candidate(id: &str, property_type: &str, amenities: &[&str]) -> Property {
        Property {
            id: id.to_string(),
            title: format!("Listing {}", id),
            property_type: property_type.to_string(),
            status: PropertyStatus::Active,
            city: "Lisbon".to_string(),
            country: None,
            amenities: amenities.iter().map(|a| a.to_string()).collect(),
            max_guests: 4,
            min_nights: 1,
            max_nights: None,
            base_price: 120.0,
            cleaning_fee: None,
            currency: "EUR".to_string(),
            rating: None,
            review_count: 0,
            deleted_at: None,
            created_at: None,
        }
    }

    fn create_signals() -> UserSignalBundle {
        UserSignalBundle {
            travel_profile: Some(TravelProfile {
                preferred_property_types: vec!["apartment".to_string()],
                must_have_amenities: vec!["wifi".to_string()],
                ..TravelProfile::default()
            }),
            ..UserSignalBundle::empty("current_user")
        }
    }

    #[test]
    fn test_rank_sorted_by_score() {
        let ranker = Ranker::default();
        let candidates = vec![
            create_candidate("1", "house", &[]),
            create_candidate("2", "apartment", &["wifi"]),
            create_candidate("3", "apartment", &[]),
        ];

        let result = ranker.rank(&create_signals(), candidates, 10);
        let ids: Vec<_> = result.candidates.iter().map(|c| c.property.id.as_str()).collect();

        assert_eq!(ids, vec!["2", "3", "1"]);
        assert!(!result.fallback);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranker = Ranker::default();
        let candidates = vec![
            create_candidate("b", "apartment", &["wifi"]),
            create_candidate("a", "apartment", &["wifi"]),
            create_candidate("c", "apartment", &["wifi"]),
        ];

        let result = ranker.rank(&create_signals(), candidates, 10);
        let ids: Vec<_> = result.candidates.iter().map(|c| c.property.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_respects_limit() {
        let ranker = Ranker::default();
        let candidates: Vec<Property> = (0..20)
            .map(|i| create_candidate(&i.to_string(), "apartment", &[]))
            .collect();

        let result = ranker.rank(&create_signals(), candidates, 5);
        assert_eq!(result.candidates.len(), 5);
        assert_eq!(result.total_candidates, 20);
    }

    #[test]
    fn test_no_signals_falls_back_to_catalog_order() {
        let ranker = Ranker::default();
        let candidates = vec![
            create_candidate("top-rated", "house", &[]),
            create_candidate("second", "apartment", &["wifi"]),
        ];

        let result = ranker.rank(&UserSignalBundle::empty("new_user"), candidates, 10);

        assert!(result.fallback);
        assert_eq!(result.candidates[0].property.id, "top-rated");
        assert!(result.candidates.iter().all(|c| c.match_score == 0.0));
    }

    #[test]
    fn test_unlisted_and_duplicate_candidates_dropped() {
        let ranker = Ranker::default();
        let mut inactive = create_candidate("2", "apartment", &["wifi"]);
        inactive.status = PropertyStatus::Inactive;
        let candidates = vec![
            create_candidate("1", "apartment", &[]),
            inactive,
            create_candidate("1", "apartment", &[]),
        ];

        let result = ranker.rank(&create_signals(), candidates, 10);
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.total_candidates, 3);
    }
}
