use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 考勤簿查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "book.ts")]
pub struct BookQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

// 创建考勤簿请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "book.ts")]
pub struct CreateBookRequest {
    pub name: String,
    pub book_code: String,
    #[serde(default = "default_session_weight")]
    pub session_weight: i32,
}

fn default_session_weight() -> i32 {
    1
}

// 替换考勤簿教师请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "book.ts")]
pub struct SetBookTeachersRequest {
    pub teacher_ids: Vec<String>,
}

// 替换考勤簿学生请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "book.ts")]
pub struct SetBookStudentsRequest {
    pub student_ids: Vec<String>,
}

// 考勤簿列表查询参数（用于存储层）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "book.ts")]
pub struct BookListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    // 仅列出该教师负责的考勤簿
    pub teacher_id: Option<String>,
    pub search: Option<String>,
}
