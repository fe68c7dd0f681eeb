// GET /api/categories — the known post categories and their reference links.

use axum::response::IntoResponse;
use axum::Json;

use crate::moderation::models::Category;

pub async fn list_categories() -> impl IntoResponse {
    let categories: Vec<serde_json::Value> = Category::ALL
        .iter()
        .map(|c| {
            serde_json::json!({
                "name": c.label(),
                "link": c.reference_link(),
            })
        })
        .collect();

    Json(serde_json::json!({ "categories": categories }))
}
