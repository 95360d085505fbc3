use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::{AttendanceMark, StudentAttendanceStats};

/// 考勤簿出勤统计响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct BookStatisticsResponse {
    pub book_id: i64,
    pub session_weight: i32,
    // 已记录的不同 (日期, 节次) 数
    pub total_sessions: i64,
    pub students: BTreeMap<String, StudentAttendanceStats>,
}

/// 日期 → 节次 → 学生 → P/A
pub type RecordsByDateSession =
    BTreeMap<chrono::NaiveDate, BTreeMap<String, BTreeMap<String, AttendanceMark>>>;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct BookRecordsResponse {
    pub book_id: i64,
    #[ts(type = "Record<string, Record<string, Record<string, AttendanceMark>>>")]
    pub records: RecordsByDateSession,
}

/// 缺勤节次
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AbsentSession {
    pub book_code: String,
    pub book_name: String,
    pub session_label: String,
}

/// 某学生当天的缺勤汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AbsenteeDigest {
    pub student_id: String,
    pub full_name: String,
    pub parent_phone: Option<String>,
    pub sessions: Vec<AbsentSession>,
}

/// 学生 ID → 缺勤汇总
pub type AbsenteeMap = BTreeMap<String, AbsenteeDigest>;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AbsenteeListResponse {
    pub date: chrono::NaiveDate,
    pub absentees: AbsenteeMap,
}
