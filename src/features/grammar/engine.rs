use lazy_static::lazy_static;
use regex::Regex;
use unidecode::unidecode;

use crate::data::models::grammar_models::GrammarPoint;

lazy_static! {
    static ref NORMALIZE_RE: Regex = Regex::new(r"[^a-zA-Z\u4e00-\u9fff]").unwrap();
}

const MATCH_THRESHOLD: f32 = 0.6;

pub struct GrammarEngine;

impl GrammarEngine {
    /// Matches a query (hanzi, pinyin with or without tone marks, or an
    /// English description) against the grammar-point list. Results come
    /// back scored, best first, pattern as the tie break.
    pub fn lookup(query: &str, points: &[GrammarPoint]) -> Vec<(GrammarPoint, f32)> {
        let query_lower = query.to_lowercase();
        let normalized = NORMALIZE_RE.replace_all(&query_lower, "");
        if normalized.is_empty() {
            return Vec::new();
        }

        let mut results = Vec::new();
        for point in points {
            let pattern = NORMALIZE_RE.replace_all(&point.pattern, "");
            let meaning_lower = point.meaning.to_lowercase();
            let meaning = NORMALIZE_RE.replace_all(&meaning_lower, "");
            let pinyin_lower = point.pinyin.to_lowercase();
            let detoned = GrammarEngine::strip_tones(&point.pinyin);
            let candidates: [&str; 4] = [&pattern, &pinyin_lower, &detoned, &meaning];
            let score = candidates
                .iter()
                .map(|candidate| GrammarEngine::similarity(&normalized, candidate))
                .fold(0.0, f32::max);

            if score >= MATCH_THRESHOLD {
                results.push((point.clone(), score));
            }
        }

        results.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.pattern.cmp(&b.0.pattern))
        });
        results
    }

    fn strip_tones(pinyin: &str) -> String {
        unidecode(pinyin)
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect()
    }

    fn similarity(a: &str, b: &str) -> f32 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        if a == b {
            return 1.0;
        }

        if b.contains(a) {
            let ratio = a.len() as f32 / b.len() as f32;
            return 0.6 + (ratio * 0.4);
        }

        if a.contains(b) {
            let ratio = b.len() as f32 / a.len() as f32;
            return 0.5 + (ratio * 0.3);
        }

        let jaro_winkler = strsim::jaro_winkler(a, b) as f32;
        if jaro_winkler > 0.85 {
            return jaro_winkler;
        }

        0.0
    }
}
