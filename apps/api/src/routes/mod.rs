pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::session::handlers as session;
use crate::state::AppState;
use crate::store::handlers as examples;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Example store
        .route(
            "/api/v1/examples/style",
            get(examples::handle_list_style).post(examples::handle_save_style),
        )
        .route(
            "/api/v1/examples/style/:id",
            get(examples::handle_get_style).delete(examples::handle_delete_style),
        )
        .route(
            "/api/v1/examples/creators",
            get(examples::handle_list_creators).post(examples::handle_save_creator),
        )
        .route(
            "/api/v1/examples/creators/grouped",
            get(examples::handle_list_creators_grouped),
        )
        .route(
            "/api/v1/examples/creators/names",
            get(examples::handle_creator_names),
        )
        .route(
            "/api/v1/examples/creators/:id",
            get(examples::handle_get_creator).delete(examples::handle_delete_creator),
        )
        // Generation
        .route("/api/v1/models", get(generation::handle_list_models))
        .route("/api/v1/focus-areas", get(generation::handle_list_focus_areas))
        .route("/api/v1/scripts/improve", post(generation::handle_improve))
        // Session results
        .route(
            "/api/v1/sessions/:session_id/script",
            get(session::handle_download_script),
        )
        .route(
            "/api/v1/sessions/:session_id",
            delete(session::handle_end_session),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::generation::context_builder::ContextBudget;
    use crate::generation::dispatcher::tests::FakeGenerator;
    use crate::generation::dispatcher::GenerationDispatcher;
    use crate::session::SessionStore;
    use crate::store::tests::test_store;

    async fn test_state(backends: Vec<(&str, Arc<FakeGenerator>)>) -> (AppState, TempDir) {
        let (store, dir) = test_store().await;
        let dispatcher = backends
            .into_iter()
            .fold(GenerationDispatcher::new(), |d, (name, backend)| {
                d.with_backend(name, backend as Arc<dyn crate::llm_client::TextGenerator>)
            });
        let state = AppState {
            store,
            dispatcher,
            sessions: SessionStore::in_memory(60),
            budget: ContextBudget::default(),
            config: Config::for_tests(),
        };
        (state, dir)
    }

    async fn send(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _dir) = test_state(vec![]).await;
        let (status, body) = send(&state, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let health: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["embedding"], "local-hashing");
        assert_eq!(health["sessions"], "memory");
        assert_eq!(health["session_ttl_secs"], 60);
        assert_eq!(health["collections"]["my_content_style"], 0);
    }

    #[tokio::test]
    async fn test_save_list_and_delete_style_example() {
        let (state, _dir) = test_state(vec![]).await;

        let (status, body) = send(
            &state,
            "POST",
            "/api/v1/examples/style",
            Some(json!({"title": "Intro Hook", "text": "Hey everyone, welcome back...", "notes": "casual"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let saved: Value = serde_json::from_str(&body).unwrap();
        let id = saved["id"].as_str().unwrap().to_string();
        assert_eq!(saved["title"], "Intro Hook");

        let (_, body) = send(&state, "GET", "/api/v1/examples/style", None).await;
        let listed: Vec<Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(listed.len(), 1);

        let (status, body) = send(&state, "GET", &format!("/api/v1/examples/style/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let fetched: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(fetched["notes"], "casual");

        let (status, _) = send(&state, "DELETE", &format!("/api/v1/examples/style/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&state, "GET", &format!("/api/v1/examples/style/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rejected_save_persists_nothing() {
        let (state, _dir) = test_state(vec![]).await;

        let (status, body) = send(
            &state,
            "POST",
            "/api/v1/examples/creators",
            Some(json!({"creator_name": "Ali", "text": "transcript"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("content_title"));

        let (_, body) = send(&state, "GET", "/api/v1/examples/creators", None).await;
        let listed: Vec<Value> = serde_json::from_str(&body).unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_no_content() {
        let (state, _dir) = test_state(vec![]).await;
        let (status, _) = send(&state, "DELETE", "/api/v1/examples/creators/creator_missing", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_creator_names_and_grouping() {
        let (state, _dir) = test_state(vec![]).await;
        for (name, title) in [("Ali", "One"), ("Emma", "Two"), ("Ali", "Three")] {
            send(
                &state,
                "POST",
                "/api/v1/examples/creators",
                Some(json!({"creator_name": name, "content_title": title, "text": "words"})),
            )
            .await;
        }

        let (_, body) = send(&state, "GET", "/api/v1/examples/creators/names", None).await;
        let names: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            names,
            json!([
                {"creator_name": "Ali", "example_count": 2},
                {"creator_name": "Emma", "example_count": 1}
            ])
        );

        let (_, body) = send(&state, "GET", "/api/v1/examples/creators/grouped", None).await;
        let groups: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(groups[0]["examples"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_model_catalog_lists_default() {
        let (state, _dir) = test_state(vec![
            ("Claude Sonnet 4", FakeGenerator::replying("claude", "x")),
            ("GPT-5", FakeGenerator::replying("gpt", "y")),
        ])
        .await;
        let (_, body) = send(&state, "GET", "/api/v1/models", None).await;
        let catalog: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(catalog["default_model"], "Claude Sonnet 4");
        assert_eq!(catalog["models"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_improve_then_download() {
        let (state, _dir) = test_state(vec![("Fake", FakeGenerator::replying("fake", "Polished!"))]).await;

        let (status, body) = send(
            &state,
            "POST",
            "/api/v1/scripts/improve",
            Some(json!({"script": "rough draft", "mode": "both", "focus": "Emotional engagement"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let improved: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(improved["improved_script"], "Polished!");
        assert_eq!(improved["model"], "Fake");
        let session_id = improved["session_id"].as_str().unwrap().to_string();

        let request = Request::builder()
            .uri(format!("/api/v1/sessions/{session_id}/script"))
            .body(Body::empty())
            .unwrap();
        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"enhanced_script.txt\""
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"Polished!");
    }

    #[tokio::test]
    async fn test_failed_improve_keeps_previous_result() {
        let (state, _dir) = test_state(vec![
            ("Good", FakeGenerator::replying("good", "First result")),
            ("Broken", FakeGenerator::failing("broken", 503)),
        ])
        .await;

        let (status, _) = send(
            &state,
            "POST",
            "/api/v1/scripts/improve",
            Some(json!({"script": "draft", "mode": "self_only", "model": "Good", "session_id": "s-1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &state,
            "POST",
            "/api/v1/scripts/improve",
            Some(json!({"script": "draft", "mode": "self_only", "model": "Broken", "session_id": "s-1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let error: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(error["error"]["code"], "GENERATION_ERROR");
        assert!(error["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Error improving script:"));

        let (status, body) = send(&state, "GET", "/api/v1/sessions/s-1/script", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "First result");
    }

    #[tokio::test]
    async fn test_unreachable_session_store_still_returns_script() {
        let (mut state, _dir) =
            test_state(vec![("Fake", FakeGenerator::replying("fake", "Kept anyway"))]).await;
        // Nothing listens on port 1, so every slot write fails to connect.
        state.sessions = SessionStore::redis(redis::Client::open("redis://127.0.0.1:1/").unwrap(), 60);

        let (status, body) = send(
            &state,
            "POST",
            "/api/v1/scripts/improve",
            Some(json!({"script": "draft", "mode": "both", "session_id": "s-3"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let improved: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(improved["improved_script"], "Kept anyway");
        assert_eq!(improved["session_id"], "s-3");
    }

    #[tokio::test]
    async fn test_ending_session_clears_result() {
        let (state, _dir) = test_state(vec![("Fake", FakeGenerator::replying("fake", "done"))]).await;
        send(
            &state,
            "POST",
            "/api/v1/scripts/improve",
            Some(json!({"script": "draft", "mode": "both", "session_id": "s-2"})),
        )
        .await;

        let (status, _) = send(&state, "DELETE", "/api/v1/sessions/s-2", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&state, "GET", "/api/v1/sessions/s-2/script", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
