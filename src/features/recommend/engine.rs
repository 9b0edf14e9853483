use crate::srs::ReviewStats;

use super::{ContentItem, ContentKind, Recommendation};

/// Due backlog beyond which new non-drill content stops being pushed.
const HEAVY_BACKLOG: i64 = 20;

pub struct RecommendationEngine;

impl RecommendationEngine {
    /// Rough HSK-level estimate from the size of the collection, nudged
    /// down one level while retention is poor.
    pub fn estimate_level(stats: &ReviewStats) -> u8 {
        let base = match stats.total_cards {
            0..=19 => 1,
            20..=49 => 2,
            50..=99 => 3,
            100..=199 => 4,
            200..=399 => 5,
            _ => 6,
        };
        match stats.retention_rate {
            Some(rate) if rate < 0.6 => (base - 1).max(1),
            _ => base,
        }
    }

    /// Scores the catalog against the learner's stats. Deterministic:
    /// score descending, catalog id as the tie break.
    pub fn recommend(
        stats: &ReviewStats,
        items: &[ContentItem],
        limit: usize,
    ) -> Vec<Recommendation> {
        let level = Self::estimate_level(stats);
        let mut scored: Vec<Recommendation> = items
            .iter()
            .filter_map(|item| {
                let score = Self::score(item, level, stats);
                (score > 0.0).then_some(Recommendation { item: *item, score })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.item.id.cmp(&b.item.id))
        });
        scored.truncate(limit);
        scored
    }

    fn score(item: &ContentItem, level: u8, stats: &ReviewStats) -> f32 {
        let distance = (item.level as i32 - level as i32).unsigned_abs();
        let mut score = 1.0 - 0.25 * distance as f32;

        // With a heavy review backlog, steer toward grammar drills
        // rather than fresh readings and lessons.
        if stats.due_now > HEAVY_BACKLOG && item.kind != ContentKind::Drill {
            score -= 0.2;
        }

        score.max(0.0)
    }
}
