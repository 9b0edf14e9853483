use lazy_static::lazy_static;

use crate::data::models::grammar_models::GrammarPoint;

pub mod engine;

pub use engine::GrammarEngine;

lazy_static! {
    static ref GRAMMAR_POINTS: Vec<GrammarPoint> =
        serde_json::from_str(include_str!("../../data/grammar_points.json"))
            .expect("embedded grammar data is valid JSON");
}

pub fn grammar_points() -> &'static [GrammarPoint] {
    &GRAMMAR_POINTS
}
