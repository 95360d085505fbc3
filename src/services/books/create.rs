use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::BookService;
use crate::models::books::requests::CreateBookRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn create_book(
    service: &BookService,
    request: &HttpRequest,
    book: CreateBookRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.create_book(book).await {
        Ok(book) => {
            info!(
                "Attendance book {} ({}) created with session weight {}",
                book.id, book.book_code, book.session_weight
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(book, "Attendance book created successfully")))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::BookCreationFailed)),
    }
}
