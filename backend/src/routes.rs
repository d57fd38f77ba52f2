use actix_files::Files;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use log::{error, info, warn};
use serde_json::json;
use shared::{ClassProbability, ErrorResponse, PredictRequest, PredictResponse};
use std::path::PathBuf;
use uuid::Uuid;

use crate::catalog;
use crate::pipeline::{ErrorCategory, InferencePipeline, PipelineError, PredictionResult, RawInput};

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: PathBuf) {
    cfg.service(web::resource("/api/predict").route(web::post().to(handle_predict)))
        .service(web::resource("/api/schema").route(web::get().to(get_schema)))
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(Files::new("/", frontend_dir).index_file("index.html"));
}

async fn handle_predict(
    pipeline: web::Data<InferencePipeline>,
    request: web::Json<PredictRequest>,
) -> HttpResponse {
    let raw = RawInput::from(request.into_inner());

    match pipeline.predict(&raw) {
        Ok(result) => {
            let response = to_response(&result, pipeline.fingerprint());
            info!(
                "Prediction {}: {} ({:.2}%)",
                response.id, response.label, response.confidence
            );
            HttpResponse::Ok().json(response)
        }
        Err(e) => error_response(&e),
    }
}

async fn get_schema(pipeline: web::Data<InferencePipeline>) -> HttpResponse {
    HttpResponse::Ok().json(catalog::dashboard_schema(&pipeline))
}

async fn health(pipeline: web::Data<InferencePipeline>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "model_fingerprint": pipeline.fingerprint(),
    }))
}

pub fn to_response(result: &PredictionResult, fingerprint: &str) -> PredictResponse {
    let probabilities = result
        .iter()
        .map(|(label, probability)| ClassProbability {
            label,
            probability,
            percent: probability * 100.0,
        })
        .collect();

    PredictResponse {
        id: Uuid::new_v4().to_string(),
        label: result.label,
        confidence: result.confidence() * 100.0,
        probabilities,
        predicted_at: Utc::now().to_rfc3339(),
        model_fingerprint: fingerprint.to_string(),
    }
}

fn error_response(e: &PipelineError) -> HttpResponse {
    let body = ErrorResponse {
        error: e.to_string(),
        kind: e.kind().to_string(),
    };
    match e.category() {
        ErrorCategory::Input => {
            warn!("Rejected prediction request: {}", e);
            HttpResponse::BadRequest().json(body)
        }
        ErrorCategory::Invariant | ErrorCategory::Fatal => {
            error!("Prediction failed: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}
