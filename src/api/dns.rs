// src/api/dns.rs
use axum::{Extension, Json, extract::rejection::JsonRejection, http::StatusCode};
use serde::Deserialize;

use crate::SharedState;
use crate::error::AppError;
use crate::manager::OperationResult;
use crate::zone::DEFAULT_TTL;

#[derive(Deserialize)]
pub struct AddRecordRequest {
    pub hostname: Option<String>,
    #[serde(rename = "type")]
    pub rrtype: Option<String>,
    pub value: Option<String>,
    pub ttl: Option<u32>,
}

#[derive(Deserialize)]
pub struct RemoveRecordRequest {
    pub hostname: Option<String>,
    #[serde(rename = "type")]
    pub rrtype: Option<String>,
}

type ApiResult = Result<(StatusCode, Json<OperationResult>), AppError>;

// POST /dns, /api/dns/add
pub async fn add_record(
    Extension(state): Extension<SharedState>,
    body: Result<Json<AddRecordRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = body.map_err(|_| AppError::bad_request("Invalid JSON"))?;

    let (Some(hostname), Some(rrtype), Some(value)) =
        (present(req.hostname), present(req.rrtype), present(req.value))
    else {
        return Err(AppError::bad_request(
            "Missing required parameters: hostname, type, value",
        ));
    };

    let result = {
        let _guard = state.write_lock.lock().await;
        state
            .manager
            .add(&hostname, &rrtype, &value, req.ttl.unwrap_or(DEFAULT_TTL))
            .await
    };
    Ok(respond(result))
}

// POST /dns-remove, /api/dns/remove
pub async fn remove_record(
    Extension(state): Extension<SharedState>,
    body: Result<Json<RemoveRecordRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = body.map_err(|_| AppError::bad_request("Invalid JSON"))?;

    let Some(hostname) = present(req.hostname) else {
        return Err(AppError::bad_request("Missing required parameter: hostname"));
    };
    let rrtype = present(req.rrtype);

    let result = {
        let _guard = state.write_lock.lock().await;
        state.manager.remove(&hostname, rrtype.as_deref()).await
    };
    Ok(respond(result))
}

// GET /dns-list, /api/dns/list
pub async fn list_records(Extension(state): Extension<SharedState>) -> ApiResult {
    Ok(respond(state.manager.list().await))
}

/// Empty strings count as missing.
fn present(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

fn respond(result: OperationResult) -> (StatusCode, Json<OperationResult>) {
    let status = match (result.success, result.kind) {
        (true, _) => StatusCode::OK,
        (false, Some(kind)) => kind.status_code(),
        (false, None) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(result))
}
