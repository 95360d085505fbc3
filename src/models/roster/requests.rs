use serde::Deserialize;
use ts_rs::TS;

// 登记学生请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "roster.ts")]
pub struct CreateStudentRequest {
    pub id: String,
    pub full_name: String,
    pub parent_phone: Option<String>,
    pub email: Option<String>,
}

// 登记教师请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "roster.ts")]
pub struct CreateTeacherRequest {
    pub id: String,
    pub full_name: String,
    pub department_id: Option<String>,
}
