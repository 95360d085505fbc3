use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::actors::ActorRole;
use crate::models::books::requests::{
    BookQueryParams, CreateBookRequest, SetBookStudentsRequest, SetBookTeachersRequest,
};
use crate::services::BookService;
use crate::utils::SafeBookIdI64;

// 懒加载的全局 BOOK_SERVICE 实例
static BOOK_SERVICE: Lazy<BookService> = Lazy::new(BookService::new_lazy);

// HTTP处理程序
pub async fn list_books(
    req: HttpRequest,
    query: web::Query<BookQueryParams>,
) -> ActixResult<HttpResponse> {
    BOOK_SERVICE.list_books(&req, query.into_inner()).await
}

pub async fn create_book(
    req: HttpRequest,
    book: web::Json<CreateBookRequest>,
) -> ActixResult<HttpResponse> {
    BOOK_SERVICE.create_book(&req, book.into_inner()).await
}

pub async fn get_book(req: HttpRequest, book_id: SafeBookIdI64) -> ActixResult<HttpResponse> {
    BOOK_SERVICE.get_book(&req, book_id.0).await
}

pub async fn delete_book(req: HttpRequest, book_id: SafeBookIdI64) -> ActixResult<HttpResponse> {
    BOOK_SERVICE.delete_book(&req, book_id.0).await
}

pub async fn set_book_teachers(
    req: HttpRequest,
    book_id: SafeBookIdI64,
    body: web::Json<SetBookTeachersRequest>,
) -> ActixResult<HttpResponse> {
    BOOK_SERVICE
        .set_book_teachers(&req, book_id.0, body.into_inner())
        .await
}

pub async fn set_book_students(
    req: HttpRequest,
    book_id: SafeBookIdI64,
    body: web::Json<SetBookStudentsRequest>,
) -> ActixResult<HttpResponse> {
    BOOK_SERVICE
        .set_book_students(&req, book_id.0, body.into_inner())
        .await
}

// 配置路由
pub fn configure_books_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/books")
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_books)
                            // 教师只能看到自己负责的考勤簿
                            .wrap(middlewares::RequireRole::new_any(ActorRole::all_roles())),
                    )
                    .route(
                        web::post()
                            .to(create_book)
                            .wrap(middlewares::RequireRole::new(&ActorRole::Admin)),
                    ),
            )
            .service(
                web::resource("/{book_id}")
                    .route(
                        web::get()
                            .to(get_book)
                            .wrap(middlewares::RequireRole::new_any(ActorRole::all_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_book)
                            // 级联删除全部考勤记录，仅管理员可用
                            .wrap(middlewares::RequireRole::new(&ActorRole::Admin)),
                    ),
            )
            .service(
                web::resource("/{book_id}/teachers").route(
                    web::put()
                        .to(set_book_teachers)
                        .wrap(middlewares::RequireRole::new_any(ActorRole::admin_roles())),
                ),
            )
            .service(
                web::resource("/{book_id}/students").route(
                    web::put()
                        .to(set_book_students)
                        .wrap(middlewares::RequireRole::new_any(ActorRole::admin_roles())),
                ),
            ),
    );
}
