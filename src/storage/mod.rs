use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::DatabaseConfig;
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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 名册方法
    // 登记学生
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student>;
    // 通过ID获取学生信息
    async fn get_student_by_id(&self, id: &str) -> Result<Option<Student>>;
    // 登记教师
    async fn create_teacher(&self, teacher: CreateTeacherRequest) -> Result<Teacher>;

    /// 考勤簿管理方法
    // 创建考勤簿
    async fn create_book(&self, book: CreateBookRequest) -> Result<AttendanceBook>;
    // 通过ID获取考勤簿
    async fn get_book_by_id(&self, book_id: i64) -> Result<Option<AttendanceBook>>;
    // 获取考勤簿名册（教师与学生）
    async fn get_book_roster(&self, book_id: i64) -> Result<BookRoster>;
    // 列出考勤簿
    async fn list_books_with_pagination(&self, query: BookListQuery) -> Result<BookListResponse>;
    // 替换考勤簿教师
    async fn set_book_teachers(&self, book_id: i64, teacher_ids: &[String]) -> Result<BookRoster>;
    // 替换考勤簿学生
    async fn set_book_students(&self, book_id: i64, student_ids: &[String]) -> Result<BookRoster>;
    // 教师是否负责该考勤簿
    async fn is_teacher_assigned(&self, book_id: i64, teacher_id: &str) -> Result<bool>;
    // 删除考勤簿（级联删除考勤记录）
    async fn delete_book(&self, book_id: i64) -> Result<bool>;

    /// 考勤记录方法
    // 点名：原子地写入整个 (考勤簿, 日期, 节次) 的记录
    async fn mark_session(
        &self,
        book_id: i64,
        date: NaiveDate,
        session_label: &str,
        present_student_ids: &HashSet<String>,
    ) -> Result<MarkSessionOutcome>;
    // 考勤簿出勤统计
    async fn get_book_statistics(&self, book_id: i64) -> Result<BookStatisticsResponse>;
    // 按日期、节次组织的出勤表
    async fn get_records_by_date_session(&self, book_id: i64) -> Result<RecordsByDateSession>;
    // 某日所有考勤簿的缺勤名单
    async fn list_absentees(&self, date: NaiveDate) -> Result<AbsenteeMap>;
}

pub async fn create_storage(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::connect(config).await?;
    Ok(Arc::new(storage))
}
