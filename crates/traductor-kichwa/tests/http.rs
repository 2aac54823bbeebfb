use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use kichwa_lexicon::Lexicon;
use tower::util::ServiceExt;

use traductor_kichwa::handlers::{AppState, router};
use traductor_kichwa::install;

fn make_state() -> AppState {
    install(Arc::new(Lexicon::bundled().unwrap()));
    AppState {
        max_input_chars: 500,
    }
}

async fn post_translate(body: &'static str) -> Response {
    router(make_state())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/translate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get(uri: &str) -> Response {
    router(make_state())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> serde_json::Value {
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn healthz_ok_once_installed() {
    let response = get("/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn translate_known_sentence() {
    let response = post_translate(r#"{"text": "Yo juego con mis amigos"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["text"], "ñuka pukllani wan ñukapak mashikuna");
    assert_eq!(body["degraded"], false);
    assert_eq!(body["unknown_words"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn translate_via_query_string() {
    let response = get("/v1/translate?text=yo%20juego%20con%20mis%20amigos").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["text"], "ñuka pukllani wan ñukapak mashikuna");
}

#[tokio::test]
async fn unknown_complement_word_is_degraded() {
    let response = post_translate(r#"{"text": "tú estudias xyznoun"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["text"], "kan yachakunki xyznoun");
    assert_eq!(body["degraded"], true);
    assert_eq!(body["unknown_words"][0], "xyznoun");
}

#[tokio::test]
async fn unknown_verb_is_unprocessable() {
    let response = post_translate(r#"{"text": "yo xyzzyverb la pelota"}"#).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["status"], "failure");
    assert_eq!(body["kind"], "unknown_verb");
    assert_eq!(body["detail"], "verb not recognized: xyzzyverb");
}

#[tokio::test]
async fn single_word_is_unprocessable() {
    let response = post_translate(r#"{"text": "hola"}"#).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "insufficient_words");
}

#[tokio::test]
async fn blank_text_is_unprocessable() {
    let response = post_translate(r#"{"text": "  ¿?  "}"#).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "empty_input");
}

#[tokio::test]
async fn rejects_oversized_input() {
    let text = "yo juego ".repeat(100);
    let response = router(make_state())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/translate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::json!({ "text": text }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("at most 500")
    );
}

#[tokio::test]
async fn rejects_malformed_json() {
    let response = post_translate(r#"{"text": "#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn translate_query_requires_text() {
    let response = get("/v1/translate").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn normalize_endpoint_cleans_text() {
    let response = get("/v1/normalize?text=%C2%A1%C3%89l%20%20JUG%C3%93!").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["text"], "el jugo");
}
