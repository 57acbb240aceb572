use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, LOCATION},
        StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use localnet_core::{http_get, HttpGetError};
use serde_json::json;
use tokio::net::TcpListener;

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/chains", get(|| async { Json(json!({ "chains": ["Avalanche", "Fantom"] })) }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "not here") }))
        .route(
            "/text",
            get(|| async { ([(CONTENT_TYPE, "text/plain")], "plain").into_response() }),
        )
        .route(
            "/moved",
            get(|| async { (StatusCode::FOUND, [(LOCATION, "/chains")]).into_response() }),
        )
        .route(
            "/untyped",
            get(|| async {
                Response::builder().status(StatusCode::OK).body(Body::from("{}")).unwrap()
            }),
        )
        .route(
            "/broken",
            get(|| async { ([(CONTENT_TYPE, "application/json")], "{ nope").into_response() }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn returns_the_parsed_body() {
    let base = spawn_server().await;

    let body = http_get(&format!("{}/chains", base)).await.unwrap();

    assert_eq!(body["chains"][1], "Fantom");
}

#[tokio::test]
async fn rejects_non_200_answers() {
    let base = spawn_server().await;

    let err = http_get(&format!("{}/missing", base)).await.unwrap_err();

    assert!(matches!(err, HttpGetError::RequestFailed { status: 404 }));
    assert_eq!(err.to_string(), "Request Failed.\nStatus Code: 404");
}

#[tokio::test]
async fn rejects_other_content_types() {
    let base = spawn_server().await;

    let err = http_get(&format!("{}/text", base)).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Invalid content-type.\nExpected application/json but received text/plain"
    );
}

#[tokio::test]
async fn rejects_malformed_json() {
    let base = spawn_server().await;

    let err = http_get(&format!("{}/broken", base)).await.unwrap_err();

    assert!(matches!(err, HttpGetError::InvalidJson(_)));
}

#[tokio::test]
async fn does_not_follow_redirects() {
    let base = spawn_server().await;

    let err = http_get(&format!("{}/moved", base)).await.unwrap_err();

    assert!(matches!(err, HttpGetError::RequestFailed { status: 302 }));
}

#[tokio::test]
async fn missing_content_type_is_reported_as_undefined() {
    let base = spawn_server().await;

    let err = http_get(&format!("{}/untyped", base)).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Invalid content-type.\nExpected application/json but received undefined"
    );
}
