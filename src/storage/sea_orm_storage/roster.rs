//! 学生、教师名册存储操作

use super::SeaOrmStorage;
use crate::entity::students::{ActiveModel as StudentActiveModel, Entity as Students};
use crate::entity::teachers::{ActiveModel as TeacherActiveModel, Entity as Teachers};
use crate::errors::{AttendanceError, Result};
use crate::models::roster::{
    entities::{Student, Teacher},
    requests::{CreateStudentRequest, CreateTeacherRequest},
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

/// 去除首尾空白，空字符串视为未填写
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SeaOrmStorage {
    /// 登记学生
    pub async fn create_student_impl(&self, req: CreateStudentRequest) -> Result<Student> {
        let id = req.id.trim();
        let full_name = req.full_name.trim();
        if id.is_empty() || full_name.is_empty() {
            return Err(AttendanceError::validation(
                "student id and full name must not be empty",
            ));
        }

        let model = StudentActiveModel {
            id: Set(id.to_string()),
            full_name: Set(full_name.to_string()),
            parent_phone: Set(non_blank(req.parent_phone)),
            email: Set(non_blank(req.email)),
            created_at: Set(chrono::Utc::now().timestamp()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AttendanceError::from_db_write(e, "登记学生失败"))?;

        Ok(result.into_student())
    }

    /// 通过 ID 获取学生
    pub async fn get_student_by_id_impl(&self, id: &str) -> Result<Option<Student>> {
        let result = Students::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 登记教师
    pub async fn create_teacher_impl(&self, req: CreateTeacherRequest) -> Result<Teacher> {
        let id = req.id.trim();
        let full_name = req.full_name.trim();
        if id.is_empty() || full_name.is_empty() {
            return Err(AttendanceError::validation(
                "teacher id and full name must not be empty",
            ));
        }

        let model = TeacherActiveModel {
            id: Set(id.to_string()),
            full_name: Set(full_name.to_string()),
            department_id: Set(non_blank(req.department_id)),
            created_at: Set(chrono::Utc::now().timestamp()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AttendanceError::from_db_write(e, "登记教师失败"))?;

        Ok(result.into_teacher())
    }

    /// 通过 ID 获取教师
    pub async fn get_teacher_by_id_impl(&self, id: &str) -> Result<Option<Teacher>> {
        let result = Teachers::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询教师失败: {e}")))?;

        Ok(result.map(|m| m.into_teacher()))
    }
}
