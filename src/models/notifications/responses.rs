use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 批量发送结果：成功数与首个错误
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "notification.ts")]
pub struct DeliveryReport {
    pub attempted: i64,
    pub success_count: i64,
    // 缺少家长手机号而跳过的学生数
    pub skipped: i64,
    pub first_error: Option<String>,
}
