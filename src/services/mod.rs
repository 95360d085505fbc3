pub mod attendance;
pub mod books;
pub mod notifications;
pub mod roster;

pub use attendance::AttendanceService;
pub use books::BookService;
pub use notifications::NotificationService;
pub use roster::RosterService;

use actix_web::HttpResponse;
use tracing::error;

use crate::errors::AttendanceError;
use crate::models::{ApiResponse, ErrorCode};

/// 将存储层错误映射为 HTTP 响应
///
/// `fallback` 用于存储故障等未细分的错误。
pub(crate) fn error_response(err: &AttendanceError, fallback: ErrorCode) -> HttpResponse {
    match err {
        AttendanceError::Validation(msg) | AttendanceError::DateParse(msg) => {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))
        }
        AttendanceError::NotFound(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::NotFound, msg))
        }
        AttendanceError::Conflict(msg) => {
            HttpResponse::Conflict().json(ApiResponse::error_empty(ErrorCode::Conflict, msg))
        }
        AttendanceError::Authorization(msg) => {
            HttpResponse::Forbidden().json(ApiResponse::error_empty(ErrorCode::Forbidden, msg))
        }
        other => {
            if other.is_storage() {
                error!("Storage failure: {}", other);
            } else {
                error!("{}", other);
            }
            HttpResponse::InternalServerError()
                .json(ApiResponse::error_empty(fallback, other.format_simple()))
        }
    }
}

/// 请求未经过 RequireRole 中间件时的响应
pub(crate) fn missing_actor_response() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::Unauthorized,
        "Unauthorized: missing actor identity",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (AttendanceError::validation("bad"), StatusCode::BAD_REQUEST),
            (AttendanceError::date_parse("bad"), StatusCode::BAD_REQUEST),
            (AttendanceError::not_found("gone"), StatusCode::NOT_FOUND),
            (AttendanceError::conflict("race"), StatusCode::CONFLICT),
            (AttendanceError::authorization("no"), StatusCode::FORBIDDEN),
            (
                AttendanceError::database_operation("boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let resp = error_response(&err, ErrorCode::InternalServerError);
            assert_eq!(resp.status(), status, "{err}");
        }
    }
}
