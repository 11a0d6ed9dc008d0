pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::cloud::handlers;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /
/// Self-describing API index with an example request.
async fn api_index() -> Json<Value> {
    Json(json!({
        "name": "WordCloud API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /api/v1/layout": {
                "description": "Compute word positions, sizes and rotations",
                "response": "LayoutResult JSON"
            },
            "POST /api/wordcloud": {
                "description": "Generate a word cloud from an array of words",
                "body": {
                    "words": [
                        { "text": "example", "weight": 100 },
                        { "text": "word", "weight": 50 }
                    ],
                    "options": {
                        "width": 800,
                        "height": 600,
                        "backgroundColor": "#ffffff",
                        "colorScheme": ["#1f77b4", "#ff7f0e", "#2ca02c"]
                    }
                },
                "response": "SVG image"
            },
            "POST /api/wordcloud/advanced": {
                "description": "Word cloud with d3-cloud style defaults: linear 12-60px sizes, continuous rotation within ±30°, padding 2, bold",
                "body": "same as POST /api/wordcloud",
                "response": "SVG image"
            },
            "GET /health": {
                "description": "Health check endpoint"
            }
        }
    }))
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api_index))
        .route("/health", get(health::health_handler))
        .route("/api/v1/layout", post(handlers::handle_layout))
        .route("/api/wordcloud", post(handlers::handle_wordcloud))
        .route(
            "/api/wordcloud/advanced",
            post(handlers::handle_wordcloud_advanced),
        )
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    use crate::config::Config;

    fn app() -> Router {
        build_router(AppState::new(Config::default()))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(res: Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ── meta ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health() {
        let res = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["status"], "ok");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_index_lists_endpoints() {
        let res = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(res).await;
        assert!(json["endpoints"]["POST /api/wordcloud"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let res = app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(res).await["error"]["code"], "NOT_FOUND");
    }

    // ── layout ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_layout_returns_result() {
        let body = json!({
            "words": [
                {"text": "alpha", "weight": 10},
                {"text": "beta", "weight": 5},
                {"text": "gamma", "value": 1}
            ],
            "options": {"width": 200, "height": 200, "scaleMode": "linear", "fontSizeRange": [10, 40], "randomSeed": 42}
        });
        let res = app().oneshot(post_json("/api/v1/layout", body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["stats"]["placedCount"], 3);
        assert_eq!(json["placements"][0]["size"], 40.0);
        assert_eq!(json["timedOut"], false);
    }

    #[tokio::test]
    async fn test_layout_empty_words_is_400() {
        let res = app()
            .oneshot(post_json("/api/v1/layout", json!({"words": []})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_layout_malformed_body_is_400() {
        let res = app()
            .oneshot(post_json("/api/v1/layout", json!({"words": [{"text": 3}]})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_layout_canvas_limit() {
        let body = json!({"words": [{"text": "a", "weight": 1}], "options": {"width": 100000}});
        let res = app().oneshot(post_json("/api/v1/layout", body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    // ── wordcloud ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_wordcloud_returns_svg() {
        let body = json!({
            "words": [{"text": "JavaScript", "value": 100}, {"text": "React", "value": 80}],
            "options": {"width": 400, "height": 300, "backgroundColor": "#000000"}
        });
        let res = app().oneshot(post_json("/api/wordcloud", body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "image/svg+xml");
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let svg = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(svg.contains("JavaScript"));
        assert!(svg.contains(r##"fill="#000000""##));
    }

    #[tokio::test]
    async fn test_wordcloud_advanced_uses_d3_preset() {
        let body = json!({
            "words": [
                {"text": "JavaScript", "value": 100},
                {"text": "React", "value": 80},
                {"text": "Node.js", "value": 70}
            ],
            "options": {"width": 400, "height": 300, "colorScheme": ["#111111", "#222222"]}
        });
        let res = app()
            .oneshot(post_json("/api/wordcloud/advanced", body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "image/svg+xml");
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let svg = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(svg.contains(r#"font-weight="bold""#), "{svg}");
        assert!(svg.contains(r#"font-size="60""#), "largest word gets the preset maximum");
        assert!(svg.contains("Node.js"));
        assert!(svg.contains(r##"fill="#111111""##));
    }

    #[tokio::test]
    async fn test_wordcloud_advanced_rejects_missing_words() {
        let res = app()
            .oneshot(post_json("/api/wordcloud/advanced", json!({"options": {}})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_index_lists_advanced_endpoint() {
        let res = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(res).await;
        assert!(json["endpoints"]["POST /api/wordcloud/advanced"].is_object());
    }

    #[tokio::test]
    async fn test_wordcloud_bad_colour_is_400() {
        let body = json!({
            "words": [{"text": "x", "value": 1}],
            "options": {"colorScheme": ["<script>"]}
        });
        let res = app().oneshot(post_json("/api/wordcloud", body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
