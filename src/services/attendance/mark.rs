use std::collections::HashSet;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::AttendanceService;
use crate::errors::AttendanceError;
use crate::middlewares::RequireRole;
use crate::models::attendance::requests::MarkSessionRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::books::check_book_access;
use crate::services::{error_response, missing_actor_response};
use crate::utils::validate::{parse_attendance_date, validate_session_label};

pub async fn mark_session(
    service: &AttendanceService,
    request: &HttpRequest,
    book_id: i64,
    body: MarkSessionRequest,
) -> ActixResult<HttpResponse> {
    let Some(actor) = RequireRole::extract_actor(request) else {
        return Ok(missing_actor_response());
    };

    let date = match parse_attendance_date(&body.date) {
        Ok(date) => date,
        Err(e) => return Ok(invalid_request(&e)),
    };
    let label = match validate_session_label(&body.session_label) {
        Ok(label) => label,
        Err(e) => return Ok(invalid_request(&e)),
    };

    let storage = service.get_storage(request);

    // 教师只能为自己负责的考勤簿点名
    if let Err(resp) = check_book_access(&storage, &actor, book_id).await {
        return Ok(resp);
    }

    let present: HashSet<String> = body
        .present_student_ids
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();

    match storage.mark_session(book_id, date, label, &present).await {
        Ok(outcome) => {
            info!(
                "Actor {} marked book {} on {} ({})",
                actor.id, book_id, date, label
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                outcome,
                "Attendance recorded successfully",
            )))
        }
        Err(e) => Ok(handle_mark_error(&e)),
    }
}

fn invalid_request(e: &AttendanceError) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::AttendanceInvalid,
        e.message(),
    ))
}

/// 点名错误响应辅助函数
fn handle_mark_error(e: &AttendanceError) -> HttpResponse {
    match e {
        AttendanceError::Validation(_) => invalid_request(e),
        // 存储层已重试一次，仍冲突时交由调用方重试
        AttendanceError::Conflict(msg) => {
            error!("Roll call conflict persisted after retry: {}", msg);
            HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::AttendanceConflict,
                "Concurrent roll call for the same session, please retry",
            ))
        }
        other => error_response(other, ErrorCode::AttendanceMarkFailed),
    }
}
