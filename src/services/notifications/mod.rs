//! 缺勤通知适配器
//!
//! 缺勤名单 → 短信正文 → 逐个发送。

pub mod digest;
pub mod dispatch;
pub mod gateway;
pub mod send;
pub mod sweep;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

pub use gateway::{LogSmsGateway, SmsGateway};

use crate::errors::Result;
use crate::models::notifications::requests::SendAbsenteeNotificationsRequest;
use crate::models::notifications::responses::DeliveryReport;
use crate::storage::Storage;

/// 生成并发送某日的缺勤短信
pub async fn notify_absentees(
    storage: &Arc<dyn Storage>,
    gateway: &dyn SmsGateway,
    date: NaiveDate,
    truncate_fields: bool,
) -> Result<DeliveryReport> {
    let absentees = storage.list_absentees(date).await?;
    let composed = digest::compose_absence_messages(&absentees, date, truncate_fields);

    for student_id in &composed.skipped {
        info!("No parent phone for student {}, skipping absence SMS", student_id);
    }

    Ok(dispatch::deliver_all(gateway, &composed.messages, composed.skipped.len()).await)
}

pub struct NotificationService {
    storage: Option<Arc<dyn Storage>>,
}

impl NotificationService {
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

    pub(crate) fn get_gateway(&self, request: &HttpRequest) -> Arc<dyn SmsGateway> {
        request
            .app_data::<actix_web::web::Data<Arc<dyn SmsGateway>>>()
            .expect("SMS gateway not found in app data")
            .get_ref()
            .clone()
    }

    // 手动触发某日缺勤短信
    pub async fn send_absentee_notifications(
        &self,
        request: &HttpRequest,
        body: SendAbsenteeNotificationsRequest,
    ) -> ActixResult<HttpResponse> {
        send::send_absentee_notifications(self, request, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::models::books::requests::CreateBookRequest;
    use crate::models::roster::requests::CreateStudentRequest;
    use crate::storage::create_storage;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGateway {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait::async_trait]
    impl SmsGateway for RecordingGateway {
        async fn send(&self, phone: &str, body: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((phone.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_notify_absentees_end_to_end() {
        let storage = create_storage(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool_size: 1,
            timeout: 5,
        })
        .await
        .unwrap();

        for (id, phone) in [("s1", Some("9800000001")), ("s2", None), ("s3", Some("9800000003"))] {
            storage
                .create_student(CreateStudentRequest {
                    id: id.to_string(),
                    full_name: format!("Student {id}"),
                    parent_phone: phone.map(str::to_string),
                    email: None,
                })
                .await
                .unwrap();
        }
        let book = storage
            .create_book(CreateBookRequest {
                name: "Physics".to_string(),
                book_code: "PH101".to_string(),
                session_weight: 1,
            })
            .await
            .unwrap();
        storage
            .set_book_students(book.id, &["s1".to_string(), "s2".to_string(), "s3".to_string()])
            .await
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let present: HashSet<String> = ["s3".to_string()].into_iter().collect();
        storage
            .mark_session(book.id, date, "P1", &present)
            .await
            .unwrap();

        let gateway = RecordingGateway::default();
        let report = notify_absentees(&storage, &gateway, date, true).await.unwrap();

        assert_eq!(report.attempted, 1);
        assert_eq!(report.success_count, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.first_error, None);

        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent[0].0, "9800000001");
        assert_eq!(
            sent[0].1,
            "Dear Parent, Student s1 (s1) was absent for 1 session(s): P1 on 04-03-25."
        );
    }
}
