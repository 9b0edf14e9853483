use serde::{Deserialize, Serialize};

/// One grammar point from the built-in reference list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarPoint {
    /// The pattern itself, e.g. `把` or `是……的`.
    pub pattern: String,
    pub pinyin: String,
    /// Short English gloss of what the pattern expresses.
    pub meaning: String,
    pub example: String,
    /// HSK level, 1-6.
    pub level: u8,
}

#[derive(Debug, Deserialize)]
pub struct GrammarParams {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct GrammarResult {
    pub query: String,
    pub results: Vec<GrammarPoint>,
}
