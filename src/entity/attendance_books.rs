//! 考勤簿实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub book_code: String,
    pub session_weight: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::book_students::Entity")]
    BookStudents,
    #[sea_orm(has_many = "super::book_teachers::Entity")]
    BookTeachers,
    #[sea_orm(has_many = "super::attendance_records::Entity")]
    AttendanceRecords,
}

impl Related<super::book_students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookStudents.def()
    }
}

impl Related<super::book_teachers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookTeachers.def()
    }
}

impl Related<super::attendance_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_book(self) -> crate::models::books::entities::AttendanceBook {
        use crate::models::books::entities::AttendanceBook;
        use chrono::{DateTime, Utc};

        AttendanceBook {
            id: self.id,
            name: self.name,
            book_code: self.book_code,
            session_weight: self.session_weight,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
