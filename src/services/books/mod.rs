pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod roster;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::actors::{Actor, ActorRole};
use crate::models::books::requests::{
    BookQueryParams, CreateBookRequest, SetBookStudentsRequest, SetBookTeachersRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::storage::Storage;

pub struct BookService {
    storage: Option<Arc<dyn Storage>>,
}

impl BookService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 获取考勤簿列表
    pub async fn list_books(
        &self,
        request: &HttpRequest,
        query: BookQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_books(self, request, query).await
    }

    pub async fn create_book(
        &self,
        request: &HttpRequest,
        book: CreateBookRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_book(self, request, book).await
    }

    // 获取考勤簿详情（含名册）
    pub async fn get_book(&self, request: &HttpRequest, book_id: i64) -> ActixResult<HttpResponse> {
        get::get_book(self, request, book_id).await
    }

    // 删除考勤簿
    pub async fn delete_book(
        &self,
        request: &HttpRequest,
        book_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_book(self, request, book_id).await
    }

    // 替换负责教师
    pub async fn set_book_teachers(
        &self,
        request: &HttpRequest,
        book_id: i64,
        body: SetBookTeachersRequest,
    ) -> ActixResult<HttpResponse> {
        roster::set_book_teachers(self, request, book_id, body).await
    }

    // 替换在册学生
    pub async fn set_book_students(
        &self,
        request: &HttpRequest,
        book_id: i64,
        body: SetBookStudentsRequest,
    ) -> ActixResult<HttpResponse> {
        roster::set_book_students(self, request, book_id, body).await
    }
}

/// 考勤簿访问能力校验
///
/// 管理员与系主任可访问全部考勤簿，教师只能访问自己负责的考勤簿。
pub(crate) async fn check_book_access(
    storage: &Arc<dyn Storage>,
    actor: &Actor,
    book_id: i64,
) -> Result<(), HttpResponse> {
    match actor.role {
        ActorRole::Admin | ActorRole::Hod => Ok(()),
        ActorRole::Teacher => match storage.is_teacher_assigned(book_id, &actor.id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::BookPermissionDenied,
                "You are not assigned to this attendance book",
            ))),
            Err(e) => Err(error_response(&e, ErrorCode::InternalServerError)),
        },
    }
}
