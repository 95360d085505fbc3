//! 考勤记录（点名）存储操作
//!
//! 一次点名在单个事务内完成：
//! 1. 读取考勤簿与当前在册学生；
//! 2. 一次读取该 (考勤簿, 日期, 节次) 已有的全部记录；
//! 3. 一次分组查询各学生在其他节次的出勤数；
//! 4. 一条多行 `INSERT ... ON CONFLICT DO UPDATE` 写入全部学生。
//!
//! 唯一索引是并发重复提交的串行化点；SQLite 下写事务另在进程内排队。
//! 若写入仍因唯一约束或写锁争用失败，整体重试一次。

use std::collections::{HashMap, HashSet};
use std::future::Future;

use chrono::NaiveDate;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};
use tracing::{debug, info, warn};

use super::{DATE_FORMAT, MAX_BIND_PARAMS, SeaOrmStorage};
use crate::entity::attendance_records::{ActiveModel, Column, Entity as AttendanceRecords};
use crate::entity::book_students::{Column as BookStudentColumn, Entity as BookStudents};
use crate::errors::{AttendanceError, Result};
use crate::models::attendance::entities::MarkSessionOutcome;

/// 每条考勤记录写入绑定的列数
const RECORD_COLUMNS: usize = 8;

/// 冲突时整体重试一次，第二次的结果原样返回
pub(crate) async fn retry_once_on_conflict<T, F, Fut>(context: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match op().await {
        Err(e) if e.is_conflict() => {
            warn!("{} hit a write conflict, retrying once: {}", context, e);
            op().await
        }
        other => other,
    }
}

impl SeaOrmStorage {
    /// 点名
    pub async fn mark_session_impl(
        &self,
        book_id: i64,
        date: NaiveDate,
        session_label: &str,
        present_student_ids: &HashSet<String>,
    ) -> Result<MarkSessionOutcome> {
        let label = session_label.trim();
        if label.is_empty() {
            return Err(AttendanceError::validation(
                "session label must not be empty",
            ));
        }

        let context = format!("Roll call for book {book_id} on {date} ({label})");
        retry_once_on_conflict(&context, move || {
            self.try_mark_session(book_id, date, label, present_student_ids)
        })
        .await
    }

    async fn try_mark_session(
        &self,
        book_id: i64,
        date: NaiveDate,
        label: &str,
        present_student_ids: &HashSet<String>,
    ) -> Result<MarkSessionOutcome> {
        let date_key = date.format(DATE_FORMAT).to_string();

        let (_gate, txn) = self.begin_write().await?;

        let book = self.ensure_book_exists(&txn, book_id).await?;
        let weight = i64::from(book.session_weight);

        let enrolled: Vec<String> = BookStudents::find()
            .select_only()
            .column(BookStudentColumn::StudentId)
            .filter(BookStudentColumn::BookId.eq(book_id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤簿学生失败: {e}")))?;

        // 出勤名单必须是在册学生的子集
        let enrolled_set: HashSet<&str> = enrolled.iter().map(String::as_str).collect();
        let mut not_enrolled: Vec<&str> = present_student_ids
            .iter()
            .map(String::as_str)
            .filter(|id| !enrolled_set.contains(id))
            .collect();
        if !not_enrolled.is_empty() {
            not_enrolled.sort_unstable();
            return Err(AttendanceError::validation(format!(
                "students not enrolled in book {book_id}: {}",
                not_enrolled.join(", ")
            )));
        }

        let existing = self
            .load_session_records(&txn, book_id, &date_key, label)
            .await?;
        let other_present = self
            .count_other_present_sessions(&txn, book_id, &date_key, label)
            .await?;

        let now = chrono::Utc::now().timestamp();
        let mut created = 0i64;
        let mut present_count = 0i64;
        let mut rows = Vec::with_capacity(enrolled.len());

        for student_id in &enrolled {
            let present = present_student_ids.contains(student_id);
            let prior = other_present.get(student_id).copied().unwrap_or(0);
            // 兼容字段：写入时的已出勤加权学时，只基于其他节次计算，重复提交不会累加
            let weighted = (prior + i64::from(present)) * weight;

            if present {
                present_count += 1;
            }
            if !existing.contains(student_id) {
                created += 1;
            }

            rows.push(ActiveModel {
                book_id: Set(book_id),
                student_id: Set(student_id.clone()),
                attendance_date: Set(date_key.clone()),
                session_label: Set(label.to_string()),
                present: Set(present),
                weighted_count: Set(i32::try_from(weighted).unwrap_or(i32::MAX)),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            });
        }

        // 按绑定参数上限分批，全部批次同属一个事务
        let mut rows = rows.into_iter().peekable();
        while rows.peek().is_some() {
            let batch: Vec<ActiveModel> = rows
                .by_ref()
                .take(MAX_BIND_PARAMS / RECORD_COLUMNS)
                .collect();
            AttendanceRecords::insert_many(batch)
                .on_conflict(
                    OnConflict::columns([
                        Column::BookId,
                        Column::StudentId,
                        Column::AttendanceDate,
                        Column::SessionLabel,
                    ])
                    // created_at 不在更新列中，首次写入时间保持不变
                    .update_columns([Column::Present, Column::WeightedCount, Column::UpdatedAt])
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AttendanceError::from_db_write(e, "写入考勤记录失败"))?;
        }

        txn.commit()
            .await
            .map_err(|e| AttendanceError::from_db_write(e, "提交考勤事务失败"))?;

        let total = enrolled.len() as i64;
        let outcome = MarkSessionOutcome {
            book_id,
            date,
            session_label: label.to_string(),
            created,
            updated: total - created,
            present_count,
            absent_count: total - present_count,
        };

        info!(
            "Roll call recorded: book={} date={} session={} created={} updated={} present={}/{}",
            book_id, date, label, outcome.created, outcome.updated, present_count, total
        );

        Ok(outcome)
    }

    /// 一次读取某 (考勤簿, 日期, 节次) 已有记录的学生集合
    async fn load_session_records<C: ConnectionTrait>(
        &self,
        conn: &C,
        book_id: i64,
        date_key: &str,
        label: &str,
    ) -> Result<HashSet<String>> {
        let students: Vec<String> = AttendanceRecords::find()
            .select_only()
            .column(Column::StudentId)
            .filter(Column::BookId.eq(book_id))
            .filter(Column::AttendanceDate.eq(date_key))
            .filter(Column::SessionLabel.eq(label))
            .into_tuple()
            .all(conn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询已有考勤记录失败: {e}")))?;

        debug!(
            "Found {} existing record(s) for book {} on {} ({})",
            students.len(),
            book_id,
            date_key,
            label
        );

        Ok(students.into_iter().collect())
    }

    /// 各学生在本考勤簿其他 (日期, 节次) 的出勤节数
    async fn count_other_present_sessions<C: ConnectionTrait>(
        &self,
        conn: &C,
        book_id: i64,
        date_key: &str,
        label: &str,
    ) -> Result<HashMap<String, i64>> {
        let rows: Vec<(String, i64)> = AttendanceRecords::find()
            .select_only()
            .column(Column::StudentId)
            .column_as(Column::Id.count(), "present_sessions")
            .filter(Column::BookId.eq(book_id))
            .filter(Column::Present.eq(true))
            .filter(
                Condition::any()
                    .add(Column::AttendanceDate.ne(date_key))
                    .add(Column::SessionLabel.ne(label)),
            )
            .group_by(Column::StudentId)
            .into_tuple()
            .all(conn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("统计出勤节数失败: {e}")))?;

        Ok(rows.into_iter().collect())
    }
}
