use axum::extract::Query;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;
use tera::Context;

use crate::data::models::{GrammarParams, GrammarResult};
use crate::features::grammar::{grammar_points, GrammarEngine};
use crate::utils::{self, render_template};

pub async fn grammar_page(
    Extension(templates): Extension<Arc<tera::Tera>>,
    session: tower_sessions::Session,
) -> impl IntoResponse {
    let mut context = Context::new();
    context.insert("query", "");
    context.insert("logged_in", &utils::is_logged_in(&session).await);
    render_template(&templates, "grammar.html", context)
}

pub async fn grammar_api(Query(params): Query<GrammarParams>) -> Json<GrammarResult> {
    let results = GrammarEngine::lookup(&params.q, grammar_points())
        .into_iter()
        .take(15)
        .map(|(point, _)| point)
        .collect();

    Json(GrammarResult {
        query: params.q,
        results,
    })
}
