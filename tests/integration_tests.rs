// tests/integration_tests.rs
use actix_web::{test, web, App, HttpResponse, HttpServer};
use awc::ws;
use futures::{SinkExt, Stream, StreamExt};
use merxman::api::{configure_routes, AppState};
use merxman::client::api::FALLBACK_ERROR;
use merxman::client::{ApiClient, WebhookSubmitter};
use merxman::config::{AppConfig, PollConfig};
use merxman::errors::AppError;
use merxman::models::{ApiResult, FormData, RequestId, SubscriptionTier, VideoStatus, VideoStyle};
use merxman::polling::{PollPhase, PollSession};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Recorded = web::Data<Mutex<Vec<Value>>>;

async fn video_status(query: web::Query<HashMap<String, String>>) -> HttpResponse {
    match query.get("request_id").map(String::as_str) {
        Some("mx-done") => HttpResponse::Ok().json(json!({
            "status": "completed",
            "request_id": "mx-done",
            "video_url": "https://cdn.example.com/mx-done.mp4"
        })),
        Some("mx-html") => HttpResponse::InternalServerError()
            .content_type("text/html")
            .body("<h1>Internal Server Error</h1>"),
        Some(id) if id.starts_with("mx-live") => HttpResponse::Ok().json(json!({
            "status": "processing",
            "request_id": id,
            "progress": 40
        })),
        _ => HttpResponse::NotFound().json(json!({
            "error": "Request not found",
            "details": "no job with that id"
        })),
    }
}

async fn form_submission(recorded: Recorded, body: web::Json<Value>) -> HttpResponse {
    recorded.lock().unwrap().push(body.into_inner());
    HttpResponse::Ok().json(json!({"success": true, "message": "queued"}))
}

async fn subscriptions_get(query: web::Query<HashMap<String, String>>) -> HttpResponse {
    if query.get("action").map(String::as_str) == Some("tiers") {
        return HttpResponse::Ok().json(json!({"tiers": ["starter", "professional"]}));
    }
    match query.get("user_id") {
        Some(user_id) => HttpResponse::Ok().json(json!({"user_id": user_id, "tier": "starter"})),
        None => HttpResponse::BadRequest().json(json!({"error": "user_id required"})),
    }
}

async fn subscriptions_post(body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Ok().json(json!({"updated": body.into_inner()}))
}

async fn hook(recorded: Recorded, body: web::Json<Value>) -> HttpResponse {
    recorded.lock().unwrap().push(body.into_inner());
    HttpResponse::Ok().body("Accepted")
}

async fn hook_down() -> HttpResponse {
    HttpResponse::ServiceUnavailable().body("maintenance")
}

/// Runs a fake functions API plus webhook on an ephemeral port.
fn spawn_upstream() -> (String, Recorded) {
    let recorded: Recorded = web::Data::new(Mutex::new(Vec::new()));
    let shared = recorded.clone();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(shared.clone())
            .service(
                web::scope("/functions/v1")
                    .route("/check-video-status", web::get().to(video_status))
                    .route("/handle-form-submission", web::post().to(form_submission))
                    .route("/manage-subscriptions", web::get().to(subscriptions_get))
                    .route("/manage-subscriptions", web::post().to(subscriptions_post)),
            )
            .route("/hook", web::post().to(hook))
            .route("/hook-down", web::post().to(hook_down))
    })
    .workers(1)
    .listen(listener)
    .unwrap()
    .run();

    actix_rt::spawn(server);
    (format!("http://127.0.0.1:{}", port), recorded)
}

fn sample_form() -> FormData {
    FormData {
        user_id: None,
        customer_name: "Aino Virtanen".to_string(),
        customer_email: "aino@example.com".to_string(),
        product_name: "Sauna Kit".to_string(),
        target_audience: "homeowners".to_string(),
        video_style: VideoStyle::Cinematic,
        duration: 15,
        brand_colors: None,
        key_message: "Relax anywhere".to_string(),
        call_to_action: Some("Order now".to_string()),
    }
}

fn api_client(base: &str) -> ApiClient {
    ApiClient::new(reqwest::Client::new(), format!("{}/functions/v1", base))
}

fn app_config(base: &str, webhook_path: &str, default_user: Option<&str>) -> AppConfig {
    let mut vars = HashMap::new();
    vars.insert("MERXMAN_API_URL".to_string(), format!("{}/functions/v1", base));
    vars.insert("MERXMAN_WEBHOOK_URL".to_string(), format!("{}{}", base, webhook_path));
    if let Some(user) = default_user {
        vars.insert("MERXMAN_DEFAULT_USER_ID".to_string(), user.to_string());
    }
    AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

#[actix_web::test]
async fn test_check_video_status_success() {
    let (base, _) = spawn_upstream();
    let client = api_client(&base);

    let result = client.check_video_status(&RequestId::new("mx-done")).await;
    let status = result.data().expect("status payload");

    assert_eq!(status.status, VideoStatus::Completed);
    assert_eq!(status.video_url.as_deref(), Some("https://cdn.example.com/mx-done.mp4"));
}

#[actix_web::test]
async fn test_request_id_is_query_encoded() {
    let (base, _) = spawn_upstream();
    let client = api_client(&base);

    let result = client.check_video_status(&RequestId::new("mx-live 1&x=2")).await;
    let status = result.data().expect("status payload");

    assert_eq!(status.request_id.as_deref(), Some("mx-live 1&x=2"));
    assert_eq!(status.progress, Some(40));
}

#[actix_web::test]
async fn test_server_error_message_surfaced() {
    let (base, _) = spawn_upstream();
    let client = api_client(&base);

    let result = client.check_video_status(&RequestId::new("mx-unknown")).await;
    assert_eq!(
        result,
        ApiResult::Failure {
            error: "Request not found".to_string(),
            details: Some("no job with that id".to_string()),
        }
    );
}

#[actix_web::test]
async fn test_non_json_error_page_uses_fallback() {
    let (base, _) = spawn_upstream();
    let client = api_client(&base);

    let result = client.check_video_status(&RequestId::new("mx-html")).await;
    assert_eq!(result.error(), Some(FALLBACK_ERROR));
    assert!(result.data().is_none());
}

#[actix_web::test]
async fn test_transport_failure_never_panics() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = ApiClient::new(reqwest::Client::new(), format!("http://127.0.0.1:{}", port));
    let result = client.get_pricing_tiers().await;

    assert!(!result.is_success());
    assert!(result.error().unwrap().starts_with("HTTP request failed"));
}

#[actix_web::test]
async fn test_submit_form_posts_camel_case_json() {
    let (base, recorded) = spawn_upstream();
    let client = api_client(&base);

    let result = client.submit_form(&sample_form()).await;
    assert_eq!(result.data().unwrap()["message"], json!("queued"));

    let bodies = recorded.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["customerName"], json!("Aino Virtanen"));
    assert_eq!(bodies[0]["videoStyle"], json!("cinematic"));
}

#[actix_web::test]
async fn test_subscription_helpers() {
    let (base, _) = spawn_upstream();
    let client = api_client(&base);

    let current = client.get_subscription("u-7").await;
    assert_eq!(current.data().unwrap()["user_id"], json!("u-7"));

    let tiers = client.get_pricing_tiers().await;
    assert_eq!(tiers.data().unwrap()["tiers"][1], json!("professional"));

    let updated = client.update_subscription("u-7", SubscriptionTier::Business).await;
    assert_eq!(
        updated.data().unwrap()["updated"],
        json!({"user_id": "u-7", "tier": "business"})
    );
}

#[actix_web::test]
async fn test_webhook_submission_returns_generated_id() {
    let (base, recorded) = spawn_upstream();
    let submitter = WebhookSubmitter::new(reqwest::Client::new(), format!("{}/hook", base));

    let request_id = submitter.submit(&sample_form(), Some("u-7")).await.unwrap();
    assert!(request_id.as_str().starts_with("mx-"));

    let bodies = recorded.lock().unwrap();
    assert_eq!(bodies[0]["request_id"], json!(request_id.as_str()));
    assert_eq!(bodies[0]["product"]["call_to_action"], json!("Order now"));
    assert_eq!(bodies[0]["metadata"]["user_id"], json!("u-7"));
}

#[actix_web::test]
async fn test_webhook_rejection_is_an_error() {
    let (base, _) = spawn_upstream();
    let submitter = WebhookSubmitter::new(reqwest::Client::new(), format!("{}/hook-down", base));

    let err = submitter.submit(&sample_form(), None).await.unwrap_err();
    assert!(matches!(err, AppError::Webhook { status: 503, ref body } if body == "maintenance"));
}

#[actix_web::test]
async fn test_session_over_real_client_completes() {
    let (base, _) = spawn_upstream();
    let client = Arc::new(api_client(&base));
    let config = PollConfig {
        interval: Duration::from_millis(50),
        max_attempts: Some(5),
    };

    let session = PollSession::start(client, RequestId::new("mx-done"), config);
    let mut rx = session.subscribe();
    let snapshot = rx.wait_for(|s| s.is_stopped()).await.unwrap().clone();

    assert_eq!(snapshot.phase, PollPhase::Completed);
    assert_eq!(snapshot.attempts, 1);
}

#[actix_web::test]
async fn test_session_surfaces_server_error() {
    let (base, _) = spawn_upstream();
    let client = Arc::new(api_client(&base));

    let session = PollSession::start(client, RequestId::new("mx-unknown"), PollConfig::default());
    let mut rx = session.subscribe();
    let snapshot = rx.wait_for(|s| s.is_stopped()).await.unwrap().clone();

    assert_eq!(snapshot.phase, PollPhase::Errored);
    assert_eq!(snapshot.error.as_deref(), Some("Request not found"));
}

#[actix_web::test]
async fn test_pricing_and_options_routes() {
    let state = AppState::new(app_config("http://127.0.0.1:9", "/hook", None));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/pricing").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["tiers"].as_array().unwrap().len(), 4);
    assert_eq!(body["data"]["tiers"][1]["videosPerMonth"], json!(50));

    let req = test::TestRequest::get().uri("/api/v1/options").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["video_styles"].as_array().unwrap().len(), 5);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn test_subscription_route_needs_a_user() {
    let state = AppState::new(app_config("http://127.0.0.1:9", "/hook", None));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/subscriptions").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert!(body.get("data").is_none());
}

#[actix_web::test]
async fn test_subscription_route_uses_default_user() {
    let (base, _) = spawn_upstream();
    let state = AppState::new(app_config(&base, "/hook", Some("house-account")));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/subscriptions").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["user_id"], json!("house-account"));
}

#[actix_web::test]
async fn test_video_route_submits_to_webhook() {
    let (base, recorded) = spawn_upstream();
    let state = AppState::new(app_config(&base, "/hook", Some("house-account")));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/videos")
        .set_json(sample_form())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 202);

    let body: Value = test::read_body_json(resp).await;
    let request_id = body["data"]["request_id"].as_str().unwrap().to_string();
    assert!(request_id.starts_with("mx-"));

    let bodies = recorded.lock().unwrap();
    assert_eq!(bodies[0]["request_id"], json!(request_id));
    assert_eq!(bodies[0]["metadata"]["user_id"], json!("house-account"));
}

#[actix_web::test]
async fn test_video_route_reports_webhook_failure() {
    let (base, _) = spawn_upstream();
    let state = AppState::new(app_config(&base, "/hook-down", None));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/videos")
        .set_json(sample_form())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 502);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["details"], json!("maintenance"));
}

/// Next JSON status view pushed over the result socket.
async fn next_view<S, E>(frames: &mut S) -> Value
where
    S: Stream<Item = Result<ws::Frame, E>> + Unpin,
    E: std::fmt::Debug,
{
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), frames.next())
            .await
            .expect("no frame within 5s")
            .expect("socket closed")
            .unwrap();
        if let ws::Frame::Text(bytes) = frame {
            return serde_json::from_slice(&bytes).unwrap();
        }
    }
}

async fn eventually(mut done: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if done() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    done()
}

#[actix_web::test]
async fn test_result_socket_pushes_until_completed() {
    let (base, _) = spawn_upstream();
    let state = AppState::new(app_config(&base, "/hook", None));
    let registry = state.polls.clone();
    let mut srv = actix_test::start(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes)
    });

    let mut socket = srv.ws_at("/ws/videos/mx-done").await.unwrap();

    let mut view = next_view(&mut socket).await;
    while view["phase"] != json!("completed") {
        assert_eq!(view["phase"], json!("checking"));
        view = next_view(&mut socket).await;
    }
    assert_eq!(view["request_id"], json!("mx-done"));
    assert_eq!(view["headline"], json!("Video ready!"));
    assert_eq!(view["video_url"], json!("https://cdn.example.com/mx-done.mp4"));
    assert_eq!(view["download_name"], json!("merxman-video-mx-done.mp4"));
    assert_eq!(view["polling"], json!(false));
    assert_eq!(registry.active_sessions(), 1);

    socket.send(ws::Message::Close(None)).await.unwrap();
    assert!(eventually(|| registry.active_sessions() == 0).await);
}

#[actix_web::test]
async fn test_closing_one_result_socket_releases_its_subscription() {
    let (base, _) = spawn_upstream();
    let state = AppState::new(app_config(&base, "/hook", None));
    let registry = state.polls.clone();
    let mut srv = actix_test::start(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes)
    });
    let id = RequestId::new("mx-live-ws");

    let mut first = srv.ws_at("/ws/videos/mx-live-ws").await.unwrap();
    let view = next_view(&mut first).await;
    assert_eq!(view["polling"], json!(true));

    let mut second = srv.ws_at("/ws/videos/mx-live-ws").await.unwrap();
    next_view(&mut second).await;
    assert!(eventually(|| registry.viewers(&id) == 2 && registry.subscribers(&id) == 2).await);
    assert_eq!(registry.active_sessions(), 1);

    // the session stays live for the second viewer
    first.send(ws::Message::Close(None)).await.unwrap();
    assert!(eventually(|| registry.viewers(&id) == 1 && registry.subscribers(&id) == 1).await);
    assert_eq!(registry.active_sessions(), 1);

    second.send(ws::Message::Close(None)).await.unwrap();
    assert!(eventually(|| registry.active_sessions() == 0).await);
}
