use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{AttendanceError, Result};

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("Invalid phone regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

/// 解析 `YYYY-MM-DD` 格式的考勤日期
pub fn parse_attendance_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AttendanceError::validation("date must not be empty"));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
        AttendanceError::validation(format!("invalid date '{raw}', expected YYYY-MM-DD: {e}"))
    })
}

/// 节次标签：去除首尾空白后不能为空，最长 64 字符
pub fn validate_session_label(label: &str) -> Result<&str> {
    let label = label.trim();
    if label.is_empty() {
        return Err(AttendanceError::validation("session label must not be empty"));
    }
    if label.chars().count() > 64 {
        return Err(AttendanceError::validation(
            "session label must be at most 64 characters",
        ));
    }
    Ok(label)
}

pub fn validate_phone(phone: &str) -> std::result::Result<(), &'static str> {
    // 手机号：可选的 + 前缀，7~15 位数字
    if !PHONE_RE.is_match(phone.trim()) {
        return Err("Phone number must be 7 to 15 digits with an optional leading +");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> std::result::Result<(), &'static str> {
    if !EMAIL_RE.is_match(email.trim()) {
        return Err("Email format is invalid");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attendance_date() {
        let date = parse_attendance_date(" 2025-03-04 ").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());

        for bad in ["", "04-03-2025", "2025-02-30", "yesterday"] {
            let err = parse_attendance_date(bad).unwrap_err();
            assert!(matches!(err, AttendanceError::Validation(_)), "{bad}");
        }
    }

    #[test]
    fn test_session_label() {
        assert_eq!(validate_session_label("  P1 ").unwrap(), "P1");
        assert!(validate_session_label("   ").is_err());
        assert!(validate_session_label(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("9812345678").is_ok());
        assert!(validate_phone("+9779812345678").is_ok());
        assert!(validate_phone("98-123").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("parent@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }
}
