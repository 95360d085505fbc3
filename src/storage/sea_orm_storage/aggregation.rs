//! 考勤聚合查询：出勤统计、出勤表、缺勤名单

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::debug;

use super::{DATE_FORMAT, MAX_BIND_PARAMS, SeaOrmStorage};
use crate::entity::attendance_books::Column as BookColumn;
use crate::entity::attendance_records::Column;
use crate::entity::book_students::Column as BookStudentColumn;
use crate::entity::prelude::{AttendanceBooks, AttendanceRecords, BookStudents, Students};
use crate::entity::students::Column as StudentColumn;
use crate::errors::{AttendanceError, Result};
use crate::models::attendance::{
    entities::{AttendanceMark, StudentAttendanceStats},
    responses::{
        AbsentSession, AbsenteeDigest, AbsenteeMap, BookStatisticsResponse, RecordsByDateSession,
    },
};

impl SeaOrmStorage {
    /// 考勤簿出勤统计
    ///
    /// 总节数为该考勤簿已记录的不同 (日期, 节次) 数，每个当前在册学生各占一项。
    pub async fn get_book_statistics_impl(&self, book_id: i64) -> Result<BookStatisticsResponse> {
        let book = self.ensure_book_exists(&self.db, book_id).await?;

        let sessions: Vec<(String, String)> = AttendanceRecords::find()
            .select_only()
            .column(Column::AttendanceDate)
            .column(Column::SessionLabel)
            .filter(Column::BookId.eq(book_id))
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("统计节次失败: {e}")))?;
        let total_sessions = sessions.len() as i64;

        let present_counts: HashMap<String, i64> = AttendanceRecords::find()
            .select_only()
            .column(Column::StudentId)
            .column_as(Column::Id.count(), "present_sessions")
            .filter(Column::BookId.eq(book_id))
            .filter(Column::Present.eq(true))
            .group_by(Column::StudentId)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("统计出勤节数失败: {e}")))?
            .into_iter()
            .collect();

        let enrolled: Vec<String> = BookStudents::find()
            .select_only()
            .column(BookStudentColumn::StudentId)
            .filter(BookStudentColumn::BookId.eq(book_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤簿学生失败: {e}")))?;

        let students = enrolled
            .into_iter()
            .map(|student_id| {
                let present = present_counts.get(&student_id).copied().unwrap_or(0);
                let stats =
                    StudentAttendanceStats::from_counts(present, total_sessions, book.session_weight);
                (student_id, stats)
            })
            .collect();

        Ok(BookStatisticsResponse {
            book_id,
            session_weight: book.session_weight,
            total_sessions,
            students,
        })
    }

    /// 按 日期 → 节次 → 学生 组织考勤簿的全部记录
    ///
    /// 已移出考勤簿的学生的历史记录同样保留在表中。
    pub async fn get_records_by_date_session_impl(
        &self,
        book_id: i64,
    ) -> Result<RecordsByDateSession> {
        self.ensure_book_exists(&self.db, book_id).await?;

        let rows: Vec<(String, String, String, bool)> = AttendanceRecords::find()
            .select_only()
            .column(Column::AttendanceDate)
            .column(Column::SessionLabel)
            .column(Column::StudentId)
            .column(Column::Present)
            .filter(Column::BookId.eq(book_id))
            .order_by_asc(Column::AttendanceDate)
            .order_by_asc(Column::SessionLabel)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤记录失败: {e}")))?;

        let mut table = RecordsByDateSession::new();
        for (date, session, student_id, present) in rows {
            let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)?;
            table
                .entry(date)
                .or_default()
                .entry(session)
                .or_default()
                .insert(student_id, AttendanceMark::from(present));
        }

        Ok(table)
    }

    /// 某日全部考勤簿的缺勤名单，按学生汇总
    pub async fn list_absentees_impl(&self, date: NaiveDate) -> Result<AbsenteeMap> {
        let date_key = date.format(DATE_FORMAT).to_string();

        let absences = AttendanceRecords::find()
            .filter(Column::AttendanceDate.eq(date_key.as_str()))
            .filter(Column::Present.eq(false))
            .order_by_asc(Column::StudentId)
            .order_by_asc(Column::BookId)
            .order_by_asc(Column::SessionLabel)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询缺勤记录失败: {e}")))?;

        if absences.is_empty() {
            return Ok(AbsenteeMap::new());
        }

        // 同一学生或考勤簿可能有大量缺勤记录，去重后分批查询
        let book_ids: Vec<i64> = absences
            .iter()
            .map(|r| r.book_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let student_ids: Vec<&str> = absences
            .iter()
            .map(|r| r.student_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut books: HashMap<i64, (String, String)> = HashMap::with_capacity(book_ids.len());
        for chunk in book_ids.chunks(MAX_BIND_PARAMS) {
            let found = AttendanceBooks::find()
                .filter(BookColumn::Id.is_in(chunk.iter().copied()))
                .all(&self.db)
                .await
                .map_err(|e| AttendanceError::database_operation(format!("查询考勤簿失败: {e}")))?;
            books.extend(found.into_iter().map(|b| (b.id, (b.book_code, b.name))));
        }

        let mut students: HashMap<String, (String, Option<String>)> =
            HashMap::with_capacity(student_ids.len());
        for chunk in student_ids.chunks(MAX_BIND_PARAMS) {
            let found = Students::find()
                .filter(StudentColumn::Id.is_in(chunk.iter().copied()))
                .all(&self.db)
                .await
                .map_err(|e| AttendanceError::database_operation(format!("查询学生失败: {e}")))?;
            students.extend(
                found
                    .into_iter()
                    .map(|s| (s.id, (s.full_name, s.parent_phone))),
            );
        }

        let mut absentees: AbsenteeMap = BTreeMap::new();
        for record in absences {
            let (Some((book_code, book_name)), Some((full_name, parent_phone))) =
                (books.get(&record.book_id), students.get(&record.student_id))
            else {
                continue;
            };

            absentees
                .entry(record.student_id.clone())
                .or_insert_with(|| AbsenteeDigest {
                    student_id: record.student_id.clone(),
                    full_name: full_name.clone(),
                    parent_phone: parent_phone.clone(),
                    sessions: Vec::new(),
                })
                .sessions
                .push(AbsentSession {
                    book_code: book_code.clone(),
                    book_name: book_name.clone(),
                    session_label: record.session_label,
                });
        }

        debug!("{} student(s) absent on {}", absentees.len(), date);

        Ok(absentees)
    }
}
