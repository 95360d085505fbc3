use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "roster.ts")]
pub struct Student {
    // 学号 / 用户 ID
    pub id: String,
    pub full_name: String,
    // 家长手机号，用于缺勤短信
    pub parent_phone: Option<String>,
    pub email: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "roster.ts")]
pub struct Teacher {
    pub id: String,
    pub full_name: String,
    pub department_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
