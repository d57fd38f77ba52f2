mod common;

use actix_web::{App, http::StatusCode, test as actix_test, web};
use common::{example_fields_json, sample_pipeline};
use serde_json::json;
use severity_backend::routes::configure_routes;
use shared::{DashboardSchema, ErrorResponse, PredictResponse, Severity};

macro_rules! init_app {
    ($frontend_dir:expr) => {
        actix_test::init_service(
            App::new()
                .app_data(web::Data::new(sample_pipeline()))
                .configure(|cfg| configure_routes(cfg, $frontend_dir.to_path_buf())),
        )
        .await
    };
}

fn frontend_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tmpdir");
    std::fs::write(dir.path().join("index.html"), "<h1>dashboard</h1>").expect("write");
    dir
}

#[actix_web::test]
async fn predict_returns_label_and_probabilities() {
    let dir = frontend_dir();
    let app = init_app!(dir.path());

    let req = actix_test::TestRequest::post()
        .uri("/api/predict")
        .set_json(json!({ "fields": example_fields_json() }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: PredictResponse = actix_test::read_body_json(resp).await;
    assert_eq!(body.label, Severity::Slight);
    let labels: Vec<Severity> = body.probabilities.iter().map(|p| p.label).collect();
    assert_eq!(labels, Severity::labels());
    let percent: f64 = body.probabilities.iter().map(|p| p.percent).sum();
    assert!((percent - 100.0).abs() < 1e-4);
    assert_eq!(body.model_fingerprint.len(), 64);
}

#[actix_web::test]
async fn predict_rejects_missing_field() {
    let dir = frontend_dir();
    let app = init_app!(dir.path());

    let mut fields = example_fields_json();
    fields.as_object_mut().unwrap().remove("Hour");
    let req = actix_test::TestRequest::post()
        .uri("/api/predict")
        .set_json(json!({ "fields": fields }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = actix_test::read_body_json(resp).await;
    assert_eq!(body.kind, "schema_mismatch");
    assert!(body.error.contains("Hour"));
}

#[actix_web::test]
async fn predict_accepts_null_numeric() {
    let dir = frontend_dir();
    let app = init_app!(dir.path());

    let mut fields = example_fields_json();
    fields["Engine_CC_Mean"] = serde_json::Value::Null;
    let req = actix_test::TestRequest::post()
        .uri("/api/predict")
        .set_json(json!({ "fields": fields }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn schema_lists_fields_in_model_order() {
    let dir = frontend_dir();
    let app = init_app!(dir.path());

    let req = actix_test::TestRequest::get().uri("/api/schema").to_request();
    let body: DashboardSchema = actix_test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.fields.len(), 9);
    assert_eq!(body.fields[0].name, "Number_of_Vehicles");
    assert_eq!(body.fields[8].options.len(), 7);
    assert_eq!(body.labels, Severity::labels());
    assert_eq!(body.model.n_trees, 6);
}

#[actix_web::test]
async fn health_reports_fingerprint() {
    let dir = frontend_dir();
    let app = init_app!(dir.path());

    let req = actix_test::TestRequest::get().uri("/api/health").to_request();
    let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert!(body["model_fingerprint"].as_str().is_some());
}

#[actix_web::test]
async fn index_page_is_served() {
    let dir = frontend_dir();
    let app = init_app!(dir.path());

    let req = actix_test::TestRequest::get().uri("/").to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
