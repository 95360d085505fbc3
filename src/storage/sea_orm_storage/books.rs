//! 考勤簿及其名册存储操作

use std::collections::{BTreeSet, HashSet};

use super::SeaOrmStorage;
use crate::entity::attendance_books::{ActiveModel, Column, Entity as AttendanceBooks};
use crate::entity::attendance_records::{Column as RecordColumn, Entity as AttendanceRecords};
use crate::entity::book_students::{
    ActiveModel as BookStudentActiveModel, Column as BookStudentColumn, Entity as BookStudents,
};
use crate::entity::book_teachers::{
    ActiveModel as BookTeacherActiveModel, Column as BookTeacherColumn, Entity as BookTeachers,
};
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::entity::teachers::{Column as TeacherColumn, Entity as Teachers};
use crate::errors::{AttendanceError, Result};
use crate::models::{
    PaginationInfo,
    books::{
        entities::{AttendanceBook, BookRoster},
        requests::{BookListQuery, CreateBookRequest},
        responses::BookListResponse,
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

/// 去重、去空白后的 ID 集合（有序，便于生成稳定的错误信息）
fn normalize_ids(ids: &[String]) -> BTreeSet<String> {
    ids.iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

impl SeaOrmStorage {
    /// 创建考勤簿
    pub async fn create_book_impl(&self, req: CreateBookRequest) -> Result<AttendanceBook> {
        let name = req.name.trim();
        let book_code = req.book_code.trim();
        if name.is_empty() {
            return Err(AttendanceError::validation("book name must not be empty"));
        }
        if book_code.is_empty() {
            return Err(AttendanceError::validation("book code must not be empty"));
        }
        if req.session_weight < 1 {
            return Err(AttendanceError::validation(format!(
                "session weight must be at least 1, got {}",
                req.session_weight
            )));
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            name: Set(name.to_string()),
            book_code: Set(book_code.to_string()),
            session_weight: Set(req.session_weight),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AttendanceError::from_db_write(e, "创建考勤簿失败"))?;

        info!(
            "Attendance book {} ({}) created with session weight {}",
            result.id, result.book_code, result.session_weight
        );

        Ok(result.into_book())
    }

    /// 通过 ID 获取考勤簿
    pub async fn get_book_by_id_impl(&self, book_id: i64) -> Result<Option<AttendanceBook>> {
        let result = AttendanceBooks::find_by_id(book_id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤簿失败: {e}")))?;

        Ok(result.map(|m| m.into_book()))
    }

    /// 获取考勤簿名册
    pub async fn get_book_roster_impl(&self, book_id: i64) -> Result<BookRoster> {
        self.load_roster(&self.db, book_id).await
    }

    async fn load_roster<C: ConnectionTrait>(&self, conn: &C, book_id: i64) -> Result<BookRoster> {
        let teacher_ids: Vec<String> = BookTeachers::find()
            .select_only()
            .column(BookTeacherColumn::TeacherId)
            .filter(BookTeacherColumn::BookId.eq(book_id))
            .order_by_asc(BookTeacherColumn::TeacherId)
            .into_tuple()
            .all(conn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤簿教师失败: {e}")))?;

        let student_ids: Vec<String> = BookStudents::find()
            .select_only()
            .column(BookStudentColumn::StudentId)
            .filter(BookStudentColumn::BookId.eq(book_id))
            .order_by_asc(BookStudentColumn::StudentId)
            .into_tuple()
            .all(conn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤簿学生失败: {e}")))?;

        Ok(BookRoster {
            teacher_ids,
            student_ids,
        })
    }

    /// 分页列出考勤簿
    pub async fn list_books_with_pagination_impl(
        &self,
        query: BookListQuery,
    ) -> Result<BookListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = AttendanceBooks::find();

        // 教师只能看到自己负责的考勤簿
        if let Some(ref teacher_id) = query.teacher_id {
            let book_ids: Vec<i64> = BookTeachers::find()
                .select_only()
                .column(BookTeacherColumn::BookId)
                .filter(BookTeacherColumn::TeacherId.eq(teacher_id.as_str()))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| {
                    AttendanceError::database_operation(format!("查询教师考勤簿失败: {e}"))
                })?;

            if book_ids.is_empty() {
                return Ok(BookListResponse {
                    items: vec![],
                    pagination: PaginationInfo {
                        page: page as i64,
                        page_size: size as i64,
                        total: 0,
                        total_pages: 0,
                    },
                });
            }

            select = select.filter(Column::Id.is_in(book_ids));
        }

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let pattern = contains_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Name.like(pattern.clone()))
                    .add(Column::BookCode.like(pattern)),
            );
        }

        // 排序
        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤簿总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤簿页数失败: {e}")))?;

        let books = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤簿列表失败: {e}")))?;

        Ok(BookListResponse {
            items: books.into_iter().map(|m| m.into_book()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 替换考勤簿教师集合
    pub async fn set_book_teachers_impl(
        &self,
        book_id: i64,
        teacher_ids: &[String],
    ) -> Result<BookRoster> {
        let wanted = normalize_ids(teacher_ids);

        let (_gate, txn) = self.begin_write().await?;

        self.ensure_book_exists(&txn, book_id).await?;

        let known: HashSet<String> = Teachers::find()
            .select_only()
            .column(TeacherColumn::Id)
            .filter(TeacherColumn::Id.is_in(wanted.iter().cloned()))
            .into_tuple::<String>()
            .all(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询教师失败: {e}")))?
            .into_iter()
            .collect();
        let unknown: Vec<&str> = wanted
            .iter()
            .filter(|id| !known.contains(*id))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(AttendanceError::validation(format!(
                "unknown teacher ids: {}",
                unknown.join(", ")
            )));
        }

        let current: HashSet<String> = BookTeachers::find()
            .select_only()
            .column(BookTeacherColumn::TeacherId)
            .filter(BookTeacherColumn::BookId.eq(book_id))
            .into_tuple::<String>()
            .all(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤簿教师失败: {e}")))?
            .into_iter()
            .collect();

        // 移除不再负责的教师
        BookTeachers::delete_many()
            .filter(BookTeacherColumn::BookId.eq(book_id))
            .filter(BookTeacherColumn::TeacherId.is_not_in(wanted.iter().cloned()))
            .exec(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("移除考勤簿教师失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        let additions: Vec<BookTeacherActiveModel> = wanted
            .iter()
            .filter(|id| !current.contains(*id))
            .map(|id| BookTeacherActiveModel {
                book_id: Set(book_id),
                teacher_id: Set(id.clone()),
                assigned_at: Set(now),
                ..Default::default()
            })
            .collect();

        if !additions.is_empty() {
            BookTeachers::insert_many(additions)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AttendanceError::from_db_write(e, "添加考勤簿教师失败"))?;
        }

        let roster = self.load_roster(&txn, book_id).await?;

        txn.commit()
            .await
            .map_err(|e| AttendanceError::from_db_write(e, "提交事务失败"))?;

        Ok(roster)
    }

    /// 替换考勤簿学生集合
    ///
    /// 被移出的学生其历史考勤记录保持不变。
    pub async fn set_book_students_impl(
        &self,
        book_id: i64,
        student_ids: &[String],
    ) -> Result<BookRoster> {
        let wanted = normalize_ids(student_ids);

        let (_gate, txn) = self.begin_write().await?;

        self.ensure_book_exists(&txn, book_id).await?;

        let known: HashSet<String> = Students::find()
            .select_only()
            .column(StudentColumn::Id)
            .filter(StudentColumn::Id.is_in(wanted.iter().cloned()))
            .into_tuple::<String>()
            .all(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学生失败: {e}")))?
            .into_iter()
            .collect();
        let unknown: Vec<&str> = wanted
            .iter()
            .filter(|id| !known.contains(*id))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(AttendanceError::validation(format!(
                "unknown student ids: {}",
                unknown.join(", ")
            )));
        }

        let current: HashSet<String> = BookStudents::find()
            .select_only()
            .column(BookStudentColumn::StudentId)
            .filter(BookStudentColumn::BookId.eq(book_id))
            .into_tuple::<String>()
            .all(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤簿学生失败: {e}")))?
            .into_iter()
            .collect();

        BookStudents::delete_many()
            .filter(BookStudentColumn::BookId.eq(book_id))
            .filter(BookStudentColumn::StudentId.is_not_in(wanted.iter().cloned()))
            .exec(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("移除考勤簿学生失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        let additions: Vec<BookStudentActiveModel> = wanted
            .iter()
            .filter(|id| !current.contains(*id))
            .map(|id| BookStudentActiveModel {
                book_id: Set(book_id),
                student_id: Set(id.clone()),
                enrolled_at: Set(now),
                ..Default::default()
            })
            .collect();

        if !additions.is_empty() {
            BookStudents::insert_many(additions)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AttendanceError::from_db_write(e, "添加考勤簿学生失败"))?;
        }

        let roster = self.load_roster(&txn, book_id).await?;

        txn.commit()
            .await
            .map_err(|e| AttendanceError::from_db_write(e, "提交事务失败"))?;

        info!(
            "Attendance book {} roster now has {} student(s)",
            book_id,
            roster.student_ids.len()
        );

        Ok(roster)
    }

    /// 教师是否负责该考勤簿
    pub async fn is_teacher_assigned_impl(&self, book_id: i64, teacher_id: &str) -> Result<bool> {
        let count = BookTeachers::find()
            .filter(BookTeacherColumn::BookId.eq(book_id))
            .filter(BookTeacherColumn::TeacherId.eq(teacher_id))
            .count(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤簿教师失败: {e}")))?;

        Ok(count > 0)
    }

    /// 删除考勤簿，同一事务内删除其考勤记录与名册
    pub async fn delete_book_impl(&self, book_id: i64) -> Result<bool> {
        let (_gate, txn) = self.begin_write().await?;

        let records = AttendanceRecords::delete_many()
            .filter(RecordColumn::BookId.eq(book_id))
            .exec(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("删除考勤记录失败: {e}")))?;

        BookStudents::delete_many()
            .filter(BookStudentColumn::BookId.eq(book_id))
            .exec(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("删除考勤簿学生失败: {e}")))?;

        BookTeachers::delete_many()
            .filter(BookTeacherColumn::BookId.eq(book_id))
            .exec(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("删除考勤簿教师失败: {e}")))?;

        let result = AttendanceBooks::delete_by_id(book_id)
            .exec(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("删除考勤簿失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| AttendanceError::from_db_write(e, "提交事务失败"))?;

        if result.rows_affected > 0 {
            info!(
                "Attendance book {} deleted together with {} record(s)",
                book_id, records.rows_affected
            );
        }

        Ok(result.rows_affected > 0)
    }

    /// 在给定连接上确认考勤簿存在
    pub(crate) async fn ensure_book_exists<C: ConnectionTrait>(
        &self,
        conn: &C,
        book_id: i64,
    ) -> Result<crate::entity::attendance_books::Model> {
        AttendanceBooks::find_by_id(book_id)
            .one(conn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤簿失败: {e}")))?
            .ok_or_else(|| AttendanceError::not_found(format!("attendance book {book_id} not found")))
    }
}
