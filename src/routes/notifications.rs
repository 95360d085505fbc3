use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::actors::ActorRole;
use crate::models::notifications::requests::SendAbsenteeNotificationsRequest;
use crate::services::NotificationService;

// 懒加载的全局 NOTIFICATION_SERVICE 实例
static NOTIFICATION_SERVICE: Lazy<NotificationService> = Lazy::new(NotificationService::new_lazy);

// HTTP处理程序
pub async fn send_absentee_notifications(
    req: HttpRequest,
    body: Option<web::Json<SendAbsenteeNotificationsRequest>>,
) -> ActixResult<HttpResponse> {
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    NOTIFICATION_SERVICE
        .send_absentee_notifications(&req, body)
        .await
}

// 配置路由
pub fn configure_notification_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/v1/notifications/absentees").route(
            web::post()
                .to(send_absentee_notifications)
                .wrap(middlewares::RequireRole::new(&ActorRole::Admin)),
        ),
    );
}
