use serde::Serialize;

pub mod catalog;
pub mod engine;

pub use catalog::CATALOG;
pub use engine::RecommendationEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Reading,
    Lesson,
    Drill,
}

/// One recommendable piece of content.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ContentItem {
    pub id: i32,
    pub title: &'static str,
    pub kind: ContentKind,
    /// HSK level, 1-6.
    pub level: u8,
    pub topic: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub item: ContentItem,
    pub score: f32,
}
