use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use taqyim_core::CoreError;

/// User-facing failure: an Arabic message for the UI plus a stable machine
/// kind. Stack traces and driver messages stay in the server logs.
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            kind: "unauthenticated",
            message: "غير مصرح بالوصول".to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "bad_request",
            message: message.into(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let kind = err.kind();
        let (status, message) = match &err {
            CoreError::Permission { .. } => {
                (StatusCode::FORBIDDEN, "صلاحيات غير كافية".to_string())
            }
            CoreError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, "البيانات غير موجودة".to_string())
            }
            CoreError::DuplicateReview { .. } => (
                StatusCode::CONFLICT,
                "تم مراجعة هذا العنصر مسبقاً".to_string(),
            ),
            CoreError::UnsupportedFileType { .. } => (
                StatusCode::BAD_REQUEST,
                "نوع الملف غير مدعوم. يرجى رفع ملف csv/xlsx/xls".to_string(),
            ),
            CoreError::Schema => (
                StatusCode::BAD_REQUEST,
                "لم يتم العثور على عمود يمثل النص (Paragraph/Text)".to_string(),
            ),
            CoreError::Encoding { .. } => (
                StatusCode::BAD_REQUEST,
                "فشل في قراءة الملف بجميع الترميزات المتاحة".to_string(),
            ),
            _ => {
                tracing::error!(%err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "خطأ في معالجة الطلب".to_string(),
                )
            }
        };
        Self {
            status,
            kind,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "kind": self.kind,
        }));
        (self.status, body).into_response()
    }
}
