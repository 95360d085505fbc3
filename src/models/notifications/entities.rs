use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 待发送的缺勤短信
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "notification.ts")]
pub struct AbsenceMessage {
    pub student_id: String,
    pub recipient_phone: String,
    pub body: String,
}
