use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::BookService;
use crate::middlewares::RequireRole;
use crate::models::books::requests::{BookListQuery, BookQueryParams};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, missing_actor_response};

pub async fn list_books(
    service: &BookService,
    request: &HttpRequest,
    query: BookQueryParams,
) -> ActixResult<HttpResponse> {
    let Some(actor) = RequireRole::extract_actor(request) else {
        return Ok(missing_actor_response());
    };
    let storage = service.get_storage(request);

    let list_query = BookListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        // 教师只能看到自己负责的考勤簿
        teacher_id: actor.is_teacher().then(|| actor.id.clone()),
        search: query.search,
    };

    match storage.list_books_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Attendance books retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}
