use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::actors::ActorRole;
use crate::models::roster::requests::{CreateStudentRequest, CreateTeacherRequest};
use crate::services::RosterService;

// 懒加载的全局 ROSTER_SERVICE 实例
static ROSTER_SERVICE: Lazy<RosterService> = Lazy::new(RosterService::new_lazy);

// HTTP处理程序
pub async fn create_student(
    req: HttpRequest,
    student: web::Json<CreateStudentRequest>,
) -> ActixResult<HttpResponse> {
    ROSTER_SERVICE
        .create_student(&req, student.into_inner())
        .await
}

pub async fn create_teacher(
    req: HttpRequest,
    teacher: web::Json<CreateTeacherRequest>,
) -> ActixResult<HttpResponse> {
    ROSTER_SERVICE
        .create_teacher(&req, teacher.into_inner())
        .await
}

// 配置路由
pub fn configure_roster_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/v1/students").route(
            web::post()
                .to(create_student)
                .wrap(middlewares::RequireRole::new(&ActorRole::Admin)),
        ),
    )
    .service(
        web::resource("/api/v1/teachers").route(
            web::post()
                .to(create_teacher)
                .wrap(middlewares::RequireRole::new(&ActorRole::Admin)),
        ),
    );
}
