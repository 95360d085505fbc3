use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::actors::ActorRole;
use crate::models::attendance::requests::{AbsenteeQuery, MarkSessionRequest};
use crate::services::AttendanceService;
use crate::utils::SafeBookIdI64;

// 懒加载的全局 ATTENDANCE_SERVICE 实例
static ATTENDANCE_SERVICE: Lazy<AttendanceService> = Lazy::new(AttendanceService::new_lazy);

// HTTP处理程序
pub async fn mark_session(
    req: HttpRequest,
    book_id: SafeBookIdI64,
    body: web::Json<MarkSessionRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .mark_session(&req, book_id.0, body.into_inner())
        .await
}

pub async fn get_records(req: HttpRequest, book_id: SafeBookIdI64) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.get_records(&req, book_id.0).await
}

pub async fn get_statistics(
    req: HttpRequest,
    book_id: SafeBookIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.get_statistics(&req, book_id.0).await
}

pub async fn list_absentees(
    req: HttpRequest,
    query: web::Query<AbsenteeQuery>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .list_absentees(&req, query.into_inner())
        .await
}

// 配置路由
pub fn configure_attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/v1/books/{book_id}/attendance")
            .route(
                web::post()
                    .to(mark_session)
                    // 教师为自己负责的考勤簿点名，管理员可为任意考勤簿点名
                    .wrap(middlewares::RequireRole::new_any(ActorRole::marking_roles())),
            )
            .route(
                web::get()
                    .to(get_records)
                    .wrap(middlewares::RequireRole::new_any(ActorRole::all_roles())),
            ),
    )
    .service(
        web::resource("/api/v1/books/{book_id}/statistics").route(
            web::get()
                .to(get_statistics)
                .wrap(middlewares::RequireRole::new_any(ActorRole::all_roles())),
        ),
    )
    .service(
        web::resource("/api/v1/absentees").route(
            web::get()
                .to(list_absentees)
                .wrap(middlewares::RequireRole::new_any(ActorRole::report_roles())),
        ),
    );
}
