use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::AttendanceService;
use crate::middlewares::RequireRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::books::check_book_access;
use crate::services::{error_response, missing_actor_response};

pub async fn get_statistics(
    service: &AttendanceService,
    request: &HttpRequest,
    book_id: i64,
) -> ActixResult<HttpResponse> {
    let Some(actor) = RequireRole::extract_actor(request) else {
        return Ok(missing_actor_response());
    };
    let storage = service.get_storage(request);

    if let Err(resp) = check_book_access(&storage, &actor, book_id).await {
        return Ok(resp);
    }

    match storage.get_book_statistics(book_id).await {
        Ok(stats) => {
            debug!(
                "Statistics for book {}: {} session(s), {} student(s)",
                book_id,
                stats.total_sessions,
                stats.students.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                stats,
                "Attendance statistics retrieved successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}
