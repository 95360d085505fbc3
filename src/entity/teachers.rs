//! 教师实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "teachers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub full_name: String,
    pub department_id: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::book_teachers::Entity")]
    BookTeachers,
}

impl Related<super::book_teachers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookTeachers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_teacher(self) -> crate::models::roster::entities::Teacher {
        use crate::models::roster::entities::Teacher;
        use chrono::{DateTime, Utc};

        Teacher {
            id: self.id,
            full_name: self.full_name,
            department_id: self.department_id,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
