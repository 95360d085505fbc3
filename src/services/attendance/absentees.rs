use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttendanceService;
use crate::models::attendance::requests::AbsenteeQuery;
use crate::models::attendance::responses::AbsenteeListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::utils::validate::parse_attendance_date;

pub async fn list_absentees(
    service: &AttendanceService,
    request: &HttpRequest,
    query: AbsenteeQuery,
) -> ActixResult<HttpResponse> {
    let date = match parse_attendance_date(&query.date) {
        Ok(date) => date,
        Err(e) => return Ok(error_response(&e, ErrorCode::BadRequest)),
    };
    let storage = service.get_storage(request);

    match storage.list_absentees(date).await {
        Ok(absentees) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AbsenteeListResponse { date, absentees },
            "Absentees retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}
