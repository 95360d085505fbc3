use serde::Deserialize;
use ts_rs::TS;

// 手动触发缺勤短信；未给出日期时使用当天
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "notification.ts")]
pub struct SendAbsenteeNotificationsRequest {
    pub date: Option<String>,
}
