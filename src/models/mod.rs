//! 数据模型定义
//!
//! - `entities`: 业务实体
//! - `requests`: HTTP 请求体与查询参数
//! - `responses`: HTTP 响应数据

pub mod actors;
pub mod attendance;
pub mod books;
pub mod common;
pub mod notifications;
pub mod roster;

pub use common::pagination::{PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

use serde::Serialize;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// API 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1xxx
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    InternalServerError = 1500,

    // 考勤簿 2xxx
    BookNotFound = 2000,
    BookCreationFailed = 2001,
    BookRosterUpdateFailed = 2002,
    BookDeleteFailed = 2003,
    BookPermissionDenied = 2004,

    // 考勤记录 3xxx
    AttendanceInvalid = 3000,
    AttendanceConflict = 3001,
    AttendanceMarkFailed = 3002,

    // 名册 4xxx
    StudentAlreadyExists = 4000,
    TeacherAlreadyExists = 4001,
    RosterCreationFailed = 4002,

    // 通知 5xxx
    NotificationFailed = 5000,
}
