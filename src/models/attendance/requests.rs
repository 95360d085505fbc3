use serde::Deserialize;
use ts_rs::TS;

// 点名请求：日期（YYYY-MM-DD）、节次标签、出勤学生 ID
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct MarkSessionRequest {
    pub date: String,
    pub session_label: String,
    #[serde(default)]
    pub present_student_ids: Vec<String>,
}

// 缺勤名单查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AbsenteeQuery {
    pub date: String,
}
