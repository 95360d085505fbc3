use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttendanceService;
use crate::middlewares::RequireRole;
use crate::models::ApiResponse;
use crate::models::ErrorCode;
use crate::models::attendance::responses::BookRecordsResponse;
use crate::services::books::check_book_access;
use crate::services::{error_response, missing_actor_response};

pub async fn get_records(
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

    match storage.get_records_by_date_session(book_id).await {
        Ok(records) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            BookRecordsResponse { book_id, records },
            "Attendance records retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}
