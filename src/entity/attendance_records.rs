//! 考勤记录实体
//!
//! 自然键 `(book_id, student_id, attendance_date, session_label)` 上有唯一索引，
//! 日期以 `YYYY-MM-DD` 字符串存储，字典序即时间序。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub book_id: i64,
    pub student_id: String,
    pub attendance_date: String,
    pub session_label: String,
    pub present: bool,
    pub weighted_count: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_books::Entity",
        from = "Column::BookId",
        to = "super::attendance_books::Column::Id"
    )]
    Book,
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
}

impl Related<super::attendance_books::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_record(self) -> crate::models::attendance::entities::AttendanceRecord {
        use crate::models::attendance::entities::AttendanceRecord;
        use chrono::{DateTime, NaiveDate, Utc};

        AttendanceRecord {
            id: self.id,
            book_id: self.book_id,
            student_id: self.student_id,
            date: NaiveDate::parse_from_str(&self.attendance_date, "%Y-%m-%d")
                .unwrap_or(NaiveDate::MIN),
            session_label: self.session_label,
            present: self.present,
            weighted_count: self.weighted_count,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
