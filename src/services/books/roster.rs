use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::BookService;
use crate::models::books::requests::{SetBookStudentsRequest, SetBookTeachersRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn set_book_teachers(
    service: &BookService,
    request: &HttpRequest,
    book_id: i64,
    body: SetBookTeachersRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.set_book_teachers(book_id, &body.teacher_ids).await {
        Ok(roster) => {
            info!(
                "Attendance book {} now has {} teacher(s)",
                book_id,
                roster.teacher_ids.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                roster,
                "Book teachers updated successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::BookRosterUpdateFailed)),
    }
}

pub async fn set_book_students(
    service: &BookService,
    request: &HttpRequest,
    book_id: i64,
    body: SetBookStudentsRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.set_book_students(book_id, &body.student_ids).await {
        Ok(roster) => {
            info!(
                "Attendance book {} now has {} student(s)",
                book_id,
                roster.student_ids.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                roster,
                "Book students updated successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::BookRosterUpdateFailed)),
    }
}
