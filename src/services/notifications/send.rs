use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Local;
use tracing::info;

use super::{NotificationService, notify_absentees};
use crate::config::AppConfig;
use crate::models::notifications::requests::SendAbsenteeNotificationsRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::utils::validate::parse_attendance_date;

pub async fn send_absentee_notifications(
    service: &NotificationService,
    request: &HttpRequest,
    body: SendAbsenteeNotificationsRequest,
) -> ActixResult<HttpResponse> {
    let date = match body.date.as_deref() {
        Some(raw) => match parse_attendance_date(raw) {
            Ok(date) => date,
            Err(e) => return Ok(error_response(&e, ErrorCode::BadRequest)),
        },
        None => Local::now().date_naive(),
    };

    let storage = service.get_storage(request);
    let gateway = service.get_gateway(request);
    let truncate = AppConfig::get().notification.truncate_fields;

    match notify_absentees(&storage, gateway.as_ref(), date, truncate).await {
        Ok(report) => {
            info!(
                "Manual absence notification for {}: {}/{} delivered",
                date, report.success_count, report.attempted
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                report,
                "Absence notifications processed",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::NotificationFailed)),
    }
}
