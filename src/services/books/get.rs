use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{BookService, check_book_access};
use crate::middlewares::RequireRole;
use crate::models::books::responses::BookDetailResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, missing_actor_response};

pub async fn get_book(
    service: &BookService,
    request: &HttpRequest,
    book_id: i64,
) -> ActixResult<HttpResponse> {
    let Some(actor) = RequireRole::extract_actor(request) else {
        return Ok(missing_actor_response());
    };
    let storage = service.get_storage(request);

    let book = match storage.get_book_by_id(book_id).await {
        Ok(Some(book)) => book,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::BookNotFound,
                "Attendance book not found",
            )));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
    };

    if let Err(resp) = check_book_access(&storage, &actor, book_id).await {
        return Ok(resp);
    }

    match storage.get_book_roster(book_id).await {
        Ok(roster) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            BookDetailResponse { book, roster },
            "Attendance book retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}
