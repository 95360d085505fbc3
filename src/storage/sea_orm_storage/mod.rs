//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod aggregation;
mod books;
mod ledger;
mod roster;

#[cfg(test)]
mod tests;

use crate::config::DatabaseConfig;
use crate::errors::{AttendanceError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

/// 考勤日期的存储格式
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// 单条语句绑定参数的上限（SQLite 默认 32766，留足余量）
pub(crate) const MAX_BIND_PARAMS: usize = 30000;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
    /// SQLite 写事务闸门，其他数据库为 None
    write_gate: Option<Arc<Mutex<()>>>,
}

impl SeaOrmStorage {
    /// 按数据库配置创建存储实例并运行迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&config.url)?;

        // 根据数据库类型选择连接方式
        let is_sqlite = db_url.starts_with("sqlite:");
        let db = if is_sqlite {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self {
            db,
            write_gate: is_sqlite.then(|| Arc::new(Mutex::new(()))),
        })
    }

    /// 开启写事务
    ///
    /// SQLite 的延迟事务先读后写，升级写锁时若已有其他写者提交会直接返回
    /// `database is locked` 而不等待 busy_timeout，因此 SQLite 下写事务在进程内排队。
    /// 返回的闸门守卫须在提交后再释放。
    pub(crate) async fn begin_write(
        &self,
    ) -> Result<(Option<OwnedMutexGuard<()>>, DatabaseTransaction)> {
        let gate = match &self.write_gate {
            Some(gate) => Some(Arc::clone(gate).lock_owned().await),
            None => None,
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AttendanceError::from_db_write(e, "开启事务失败"))?;

        Ok((gate, txn))
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| AttendanceError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size.max(1))
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| AttendanceError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| AttendanceError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(AttendanceError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite:, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    attendance::{
        entities::MarkSessionOutcome,
        responses::{AbsenteeMap, BookStatisticsResponse, RecordsByDateSession},
    },
    books::{
        entities::{AttendanceBook, BookRoster},
        requests::{BookListQuery, CreateBookRequest},
        responses::BookListResponse,
    },
    roster::{
        entities::{Student, Teacher},
        requests::{CreateStudentRequest, CreateTeacherRequest},
    },
};
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 名册模块
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(student).await
    }

    async fn get_student_by_id(&self, id: &str) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn create_teacher(&self, teacher: CreateTeacherRequest) -> Result<Teacher> {
        self.create_teacher_impl(teacher).await
    }

    // 考勤簿模块
    async fn create_book(&self, book: CreateBookRequest) -> Result<AttendanceBook> {
        self.create_book_impl(book).await
    }

    async fn get_book_by_id(&self, book_id: i64) -> Result<Option<AttendanceBook>> {
        self.get_book_by_id_impl(book_id).await
    }

    async fn get_book_roster(&self, book_id: i64) -> Result<BookRoster> {
        self.get_book_roster_impl(book_id).await
    }

    async fn list_books_with_pagination(&self, query: BookListQuery) -> Result<BookListResponse> {
        self.list_books_with_pagination_impl(query).await
    }

    async fn set_book_teachers(&self, book_id: i64, teacher_ids: &[String]) -> Result<BookRoster> {
        self.set_book_teachers_impl(book_id, teacher_ids).await
    }

    async fn set_book_students(&self, book_id: i64, student_ids: &[String]) -> Result<BookRoster> {
        self.set_book_students_impl(book_id, student_ids).await
    }

    async fn is_teacher_assigned(&self, book_id: i64, teacher_id: &str) -> Result<bool> {
        self.is_teacher_assigned_impl(book_id, teacher_id).await
    }

    async fn delete_book(&self, book_id: i64) -> Result<bool> {
        self.delete_book_impl(book_id).await
    }

    // 考勤记录模块
    async fn mark_session(
        &self,
        book_id: i64,
        date: NaiveDate,
        session_label: &str,
        present_student_ids: &HashSet<String>,
    ) -> Result<MarkSessionOutcome> {
        self.mark_session_impl(book_id, date, session_label, present_student_ids)
            .await
    }

    async fn get_book_statistics(&self, book_id: i64) -> Result<BookStatisticsResponse> {
        self.get_book_statistics_impl(book_id).await
    }

    async fn get_records_by_date_session(&self, book_id: i64) -> Result<RecordsByDateSession> {
        self.get_records_by_date_session_impl(book_id).await
    }

    async fn list_absentees(&self, date: NaiveDate) -> Result<AbsenteeMap> {
        self.list_absentees_impl(date).await
    }
}
