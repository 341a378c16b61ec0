//! Route handlers
//!
//! Thin translation between HTTP payloads and the scheduler's typed
//! results. Body-level status codes (200 / 901 / 701 / 601 / 500) are
//! the contract the polling clients already speak.

use crate::error::AppError;
use crate::models::JobParams;
use crate::orchestrator::{ProgressReport, RetrieveOutcome, Scheduler};
use actix_web::{get, post, web, HttpResponse, Result};
use serde::Deserialize;
use serde_json::{json, Value};

/// Submission fields arrive as JSON numbers or numeric strings;
/// accept both, like the original boundary did.
fn int_field(body: &Value, key: &str) -> Result<u32, AppError> {
    let value = body
        .get(key)
        .ok_or_else(|| AppError::invalid_parameters(format!("missing field '{}'", key)))?;
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| AppError::invalid_parameters(format!("'{}' is out of range", key))),
        Value::String(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| AppError::invalid_parameters(format!("'{}' is not a number", key))),
        _ => Err(AppError::invalid_parameters(format!(
            "'{}' is not a number",
            key
        ))),
    }
}

fn string_field(body: &Value, key: &str) -> Result<String, AppError> {
    body.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::invalid_parameters(format!("missing field '{}'", key)))
}

fn parse_submission(body: &Value) -> Result<JobParams, AppError> {
    Ok(JobParams {
        department: int_field(body, "department")?,
        semester: int_field(body, "semester")?,
        maxroll: int_field(body, "maxroll")?,
        roll_prefix: string_field(body, "rollPrefix")?,
    })
}

/// Submit a bulk scrape request.
#[post("/requests")]
pub async fn submit(
    scheduler: web::Data<Scheduler>,
    body: web::Json<Value>,
) -> Result<HttpResponse> {
    let params = match parse_submission(&body) {
        Ok(params) => params,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() })));
        }
    };

    match scheduler.submit(params) {
        Ok(id) => Ok(HttpResponse::Ok().json(json!({ "uuid": id }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))),
    }
}

#[derive(Deserialize)]
pub struct UuidQuery {
    uuid: Option<String>,
}

/// Poll a job's progress. Idempotent and side-effect free.
#[get("/progress")]
pub async fn progress(
    scheduler: web::Data<Scheduler>,
    query: web::Query<UuidQuery>,
) -> Result<HttpResponse> {
    let report = query
        .uuid
        .as_deref()
        .map(|id| scheduler.progress(id))
        .unwrap_or(ProgressReport::Unknown);

    let payload = match report {
        ProgressReport::Known { progress, max, .. } => {
            json!({ "progress": progress, "max": max, "status": "200" })
        }
        ProgressReport::Unknown => {
            json!({ "progress": "0", "max": "0", "status": "901" })
        }
    };
    Ok(HttpResponse::Ok().json(payload))
}

/// Fetch the packaged artifact for a terminal job.
///
/// Body-level codes: 200 packaged, 901 unknown id, 701 not yet
/// terminal, 601 completed with zero rows, 500 job failed or packaging
/// failed.
#[get("/getfile")]
pub async fn getfile(
    scheduler: web::Data<Scheduler>,
    query: web::Query<UuidQuery>,
) -> Result<HttpResponse> {
    let outcome = query
        .uuid
        .as_deref()
        .map(|id| scheduler.retrieve(id))
        .unwrap_or(RetrieveOutcome::Unknown);

    let payload = match outcome {
        RetrieveOutcome::Packaged(path) => {
            json!({ "status": 200, "file": path.display().to_string() })
        }
        RetrieveOutcome::Unknown => json!({ "status": 901, "file": "Resource Not Found" }),
        RetrieveOutcome::NotReady => json!({ "status": 701, "file": "Result not ready" }),
        RetrieveOutcome::Empty => json!({ "status": 601, "file": "No records collected" }),
        RetrieveOutcome::Failed(reason) => json!({ "status": 500, "error": reason }),
        RetrieveOutcome::PackagingError(e) => json!({ "status": 500, "error": e.to_string() }),
    };
    Ok(HttpResponse::Ok().json(payload))
}
