//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_attendance_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum AttendanceError {
            $($variant(String),)*
        }

        impl AttendanceError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(AttendanceError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(AttendanceError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(AttendanceError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl AttendanceError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        AttendanceError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_attendance_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    Validation("E004", "Validation Error"),
    Conflict("E005", "Conflict Error"),
    NotFound("E006", "Resource Not Found"),
    Serialization("E007", "Serialization Error"),
    DateParse("E008", "Date Parse Error"),
    Authorization("E009", "Authorization Error"),
    NotificationDelivery("E010", "Notification Delivery Error"),
    FileOperation("E011", "File Operation Error"),
}

impl AttendanceError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为可重试的唯一约束冲突
    pub fn is_conflict(&self) -> bool {
        matches!(self, AttendanceError::Conflict(_))
    }

    /// 存储层错误（连接、配置或执行失败）
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            AttendanceError::DatabaseConfig(_)
                | AttendanceError::DatabaseConnection(_)
                | AttendanceError::DatabaseOperation(_)
        )
    }

    /// 将数据库写入错误按可重试冲突与一般存储错误区分
    ///
    /// 唯一约束冲突与 SQLite 写锁争用（SQLITE_BUSY / SQLITE_LOCKED 及其扩展码）都视为冲突。
    pub fn from_db_write(err: sea_orm::DbErr, context: &str) -> Self {
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return AttendanceError::Conflict(format!("{context}: {detail}"));
        }
        if is_lock_contention(&err) {
            return AttendanceError::Conflict(format!("{context}: {err}"));
        }
        AttendanceError::DatabaseOperation(format!("{context}: {err}"))
    }
}

/// SQLite 主错误码：SQLITE_BUSY = 5，SQLITE_LOCKED = 6
fn is_lock_contention(err: &sea_orm::DbErr) -> bool {
    use sea_orm::{DbErr, RuntimeErr};

    let (DbErr::Exec(RuntimeErr::SqlxError(e))
    | DbErr::Query(RuntimeErr::SqlxError(e))
    | DbErr::Conn(RuntimeErr::SqlxError(e))) = err
    else {
        return false;
    };
    let sea_orm::sqlx::Error::Database(db_err) = e.as_ref() else {
        return false;
    };
    if db_err
        .try_downcast_ref::<sea_orm::sqlx::sqlite::SqliteError>()
        .is_none()
    {
        return false;
    }

    db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, 5 | 6))
}

impl fmt::Display for AttendanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AttendanceError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for AttendanceError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                AttendanceError::Conflict(detail)
            }
            _ => AttendanceError::DatabaseOperation(err.to_string()),
        }
    }
}

impl From<std::io::Error> for AttendanceError {
    fn from(err: std::io::Error) -> Self {
        AttendanceError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for AttendanceError {
    fn from(err: serde_json::Error) -> Self {
        AttendanceError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for AttendanceError {
    fn from(err: chrono::ParseError) -> Self {
        AttendanceError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AttendanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AttendanceError::database_config("test").code(), "E001");
        assert_eq!(AttendanceError::validation("test").code(), "E004");
        assert_eq!(AttendanceError::conflict("test").code(), "E005");
        assert_eq!(AttendanceError::notification_delivery("test").code(), "E010");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            AttendanceError::database_operation("test").error_type(),
            "Database Operation Error"
        );
        assert_eq!(
            AttendanceError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = AttendanceError::validation("session label must not be empty");
        assert_eq!(err.message(), "session label must not be empty");
    }

    #[test]
    fn test_format_simple() {
        let err = AttendanceError::not_found("book 42");
        let formatted = err.format_simple();
        assert!(formatted.contains("Resource Not Found"));
        assert!(formatted.contains("book 42"));
    }

    #[test]
    fn test_error_classification() {
        assert!(AttendanceError::conflict("dup").is_conflict());
        assert!(!AttendanceError::validation("bad").is_conflict());
        assert!(AttendanceError::database_connection("down").is_storage());
        assert!(AttendanceError::database_operation("fail").is_storage());
        assert!(!AttendanceError::not_found("x").is_storage());
    }

    #[test]
    fn test_unrelated_write_error_is_not_conflict() {
        let err = AttendanceError::from_db_write(
            sea_orm::DbErr::Custom("disk I/O error".to_string()),
            "写入考勤记录失败",
        );
        assert!(!err.is_conflict());
        assert!(err.is_storage());
        assert!(err.message().starts_with("写入考勤记录失败"));
    }

    #[test]
    fn test_plain_db_error_is_storage() {
        let err: AttendanceError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(err.is_storage());
    }
}
