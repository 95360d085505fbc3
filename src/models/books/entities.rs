use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "book.ts")]
pub struct AttendanceBook {
    // 考勤簿ID
    pub id: i64,
    // 考勤簿名称
    pub name: String,
    // 课程简码
    pub book_code: String,
    // 每节课折算的学时数（理论课 1，实验课 1~4）
    pub session_weight: i32,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
    // 更新时间
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 考勤簿名册
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "book.ts")]
pub struct BookRoster {
    pub teacher_ids: Vec<String>,
    pub student_ids: Vec<String>,
}
