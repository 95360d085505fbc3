use super::entities::{AttendanceBook, BookRoster};
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

// 考勤簿列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "book.ts")]
pub struct BookListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<AttendanceBook>,
}

// 考勤簿详情响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "book.ts")]
pub struct BookDetailResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub book: AttendanceBook,
    #[serde(flatten)]
    #[ts(flatten)]
    pub roster: BookRoster,
}
