use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 考勤记录：每个 (考勤簿, 学生, 日期, 节次) 至多一条
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceRecord {
    pub id: i64,
    pub book_id: i64,
    pub student_id: String,
    pub date: chrono::NaiveDate,
    pub session_label: String,
    pub present: bool,
    // 写入时该生在本考勤簿的已出勤加权学时（兼容字段，统计不读取）
    pub weighted_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 出勤标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub enum AttendanceMark {
    #[serde(rename = "P")]
    Present,
    #[serde(rename = "A")]
    Absent,
}

impl From<bool> for AttendanceMark {
    fn from(present: bool) -> Self {
        if present {
            AttendanceMark::Present
        } else {
            AttendanceMark::Absent
        }
    }
}

/// 单个学生在某考勤簿的出勤统计
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct StudentAttendanceStats {
    pub attended_weighted: i64,
    pub total_weighted: i64,
    pub percentage: f64,
}

impl StudentAttendanceStats {
    /// 由出勤节数、考勤簿总节数与每节学时计算统计值。
    ///
    /// `total_weighted` 为 0 时百分比定义为 0。
    pub fn from_counts(present_sessions: i64, total_sessions: i64, session_weight: i32) -> Self {
        let weight = i64::from(session_weight);
        let attended_weighted = present_sessions * weight;
        let total_weighted = total_sessions * weight;

        let percentage = if total_weighted > 0 {
            round_to_two_places(attended_weighted as f64 / total_weighted as f64 * 100.0)
        } else {
            0.0
        };

        Self {
            attended_weighted,
            total_weighted,
            percentage,
        }
    }
}

/// 保留两位小数
pub fn round_to_two_places(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 一次点名的写入结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct MarkSessionOutcome {
    pub book_id: i64,
    pub date: chrono::NaiveDate,
    pub session_label: String,
    // 新建记录数
    pub created: i64,
    // 原地更新记录数
    pub updated: i64,
    pub present_count: i64,
    pub absent_count: i64,
}
