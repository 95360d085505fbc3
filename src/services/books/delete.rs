use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::BookService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn delete_book(
    service: &BookService,
    request: &HttpRequest,
    book_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_book(book_id).await {
        Ok(true) => {
            info!("Attendance book {} deleted", book_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Attendance book deleted successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::BookNotFound,
            "Attendance book not found",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::BookDeleteFailed)),
    }
}
