use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use taqyim_core::review::{self, ReviewSubmission};
use taqyim_core::types::{Principal, Role};
use taqyim_core::{ingest, stats, Decision};

use crate::error::ApiError;
use crate::state::AppState;

/// The session layer in front of this service resolves the cookie into
/// `x-user-id` / `x-user-role` headers; the core only ever sees the
/// explicit principal built here.
fn principal(headers: &HeaderMap) -> Result<Principal, ApiError> {
    let id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(ApiError::unauthenticated)?;
    let role = headers
        .get("x-user-role")
        .and_then(|v| v.to_str().ok())
        .and_then(Role::parse)
        .ok_or_else(ApiError::unauthenticated)?;
    Ok(Principal::new(id, role))
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    /// Raw file bytes, base64-encoded.
    pub content: String,
}

pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UploadRequest>,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&headers)?;

    let extension = payload
        .filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_string())
        .ok_or_else(|| ApiError::bad_request("لم يتم اختيار ملف صالح"))?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&payload.content)
        .map_err(|_| ApiError::bad_request("محتوى الملف غير صالح"))?;

    let receipt = ingest::ingest_upload(
        &state.pool,
        &principal,
        &state.config,
        &payload.filename,
        &extension,
        &bytes,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("تم رفع الملف بنجاح. تم معالجة {} سجل", receipt.processed_records),
        "session_id": receipt.session_id,
        "total_records": receipt.total_records,
        "successful_records": receipt.processed_records,
        "failed_records": receipt.failed_records,
    })))
}

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    10
}

fn default_status() -> String {
    "pending".to_string()
}

pub async fn list_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DataQuery>,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&headers)?;

    // Reviewers only ever see pending items they have not yet adjudicated.
    let page = match principal.role {
        Role::Reviewer if query.status == "pending" => {
            review::pending_for_reviewer(&state.pool, &principal.id, query.page, query.per_page)
                .await?
        }
        _ => review::list_by_status(&state.pool, &query.status, query.page, query.per_page).await?,
    };

    let per_page = query.per_page.clamp(1, 100);
    let pages = if page.total == 0 {
        0
    } else {
        (page.total + per_page - 1) / per_page
    };

    Ok(Json(json!({
        "data": page.items,
        "total": page.total,
        "pages": pages,
        "current_page": query.page,
        "has_next": query.page < pages,
        "has_prev": query.page > 1,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub data_id: String,
    pub decision: String,
    pub new_tag_en: Option<String>,
    pub new_tag_ar: Option<String>,
    pub notes: Option<String>,
    pub confidence: Option<i64>,
    pub time_spent: Option<i64>,
}

pub async fn submit_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&headers)?;

    let decision = Decision::parse(&payload.decision)
        .ok_or_else(|| ApiError::bad_request("قرار المراجعة غير صالح"))?;

    let review = review::submit_review(
        &state.pool,
        &principal,
        ReviewSubmission {
            data_id: payload.data_id,
            decision,
            new_tag_en: payload.new_tag_en,
            new_tag_ar: payload.new_tag_ar,
            notes: payload.notes,
            confidence: payload.confidence,
            time_spent: payload.time_spent,
        },
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "تم إرسال المراجعة بنجاح",
        "review_id": review.id,
    })))
}

pub async fn get_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&headers)?;

    let overall = stats::overall(&state.pool).await?;
    let mut body = json!({
        "total_data": overall.total_data,
        "pending_data": overall.pending_data,
        "reviewed_data": overall.reviewed_data,
        "approved_data": overall.approved_data,
        "completion_rate": overall.completion_rate,
    });

    if principal.role == Role::Reviewer {
        let personal = stats::personal(&state.pool, &principal.id).await?;
        if let Some(map) = body.as_object_mut() {
            map.insert("user_reviews".into(), personal.user_reviews.into());
            map.insert("user_approvals".into(), personal.user_approvals.into());
            map.insert(
                "user_approval_rate".into(),
                json!(personal.user_approval_rate),
            );
        }
    }

    Ok(Json(body))
}

pub async fn daily_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&headers)?;
    let daily = stats::daily(&state.pool, &principal, Utc::now()).await?;
    Ok(Json(json!({
        "daily_reviews": daily.daily_reviews,
        "avg_review_time": daily.avg_review_time,
    })))
}

pub async fn reviewer_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&headers)?;
    let performance = stats::reviewer_performance(&state.pool, &principal).await?;
    Ok(Json(serde_json::to_value(&performance).map_err(taqyim_core::CoreError::from)?))
}

pub async fn upload_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&headers)?;
    let sessions = ingest::list_sessions(&state.pool, &principal).await?;
    Ok(Json(serde_json::to_value(&sessions).map_err(taqyim_core::CoreError::from)?))
}
