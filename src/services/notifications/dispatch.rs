use tracing::{debug, warn};

use super::gateway::SmsGateway;
use crate::models::notifications::entities::AbsenceMessage;
use crate::models::notifications::responses::DeliveryReport;

/// 依次发送全部短信
///
/// 单个收件人失败只记录日志，不影响其余收件人；结果中保留首个错误。
pub async fn deliver_all(
    gateway: &dyn SmsGateway,
    messages: &[AbsenceMessage],
    skipped: usize,
) -> DeliveryReport {
    let mut report = DeliveryReport {
        skipped: skipped as i64,
        ..Default::default()
    };

    for message in messages {
        report.attempted += 1;
        match gateway.send(&message.recipient_phone, &message.body).await {
            Ok(()) => {
                report.success_count += 1;
                debug!("Absence SMS sent for student {}", message.student_id);
            }
            Err(e) => {
                warn!(
                    "Failed to send absence SMS for student {} to {}: {}",
                    message.student_id, message.recipient_phone, e
                );
                if report.first_error.is_none() {
                    report.first_error = Some(e.to_string());
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AttendanceError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 对指定号码失败的测试网关
    struct FlakyGateway {
        failing: Vec<&'static str>,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SmsGateway for FlakyGateway {
        async fn send(&self, phone: &str, _body: &str) -> Result<()> {
            if self.failing.iter().any(|f| *f == phone) {
                return Err(AttendanceError::notification_delivery(format!(
                    "gateway rejected {phone}"
                )));
            }
            self.sent.lock().unwrap().push(phone.to_string());
            Ok(())
        }
    }

    fn message(phone: &str) -> AbsenceMessage {
        AbsenceMessage {
            student_id: format!("s-{phone}"),
            recipient_phone: phone.to_string(),
            body: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_going() {
        let gateway = FlakyGateway {
            failing: vec!["111", "333"],
            sent: Mutex::new(Vec::new()),
        };
        let messages = vec![message("111"), message("222"), message("333"), message("444")];

        let report = deliver_all(&gateway, &messages, 2).await;

        assert_eq!(report.attempted, 4);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.skipped, 2);
        assert!(report.first_error.unwrap().contains("111"));
        assert_eq!(*gateway.sent.lock().unwrap(), vec!["222", "444"]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let gateway = FlakyGateway {
            failing: vec![],
            sent: Mutex::new(Vec::new()),
        };
        let report = deliver_all(&gateway, &[], 0).await;
        assert_eq!(report, DeliveryReport::default());
    }
}
