use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::RosterService;
use crate::errors::AttendanceError;
use crate::models::roster::requests::{CreateStudentRequest, CreateTeacherRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::utils::validate::{validate_email, validate_phone};

pub async fn create_student(
    service: &RosterService,
    request: &HttpRequest,
    student: CreateStudentRequest,
) -> ActixResult<HttpResponse> {
    // 联系方式校验（空字符串视为未填写）
    if let Some(phone) = student.parent_phone.as_deref().filter(|p| !p.trim().is_empty())
        && let Err(msg) = validate_phone(phone)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            msg,
        )));
    }
    if let Some(email) = student.email.as_deref().filter(|e| !e.trim().is_empty())
        && let Err(msg) = validate_email(email)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            msg,
        )));
    }

    let storage = service.get_storage(request);

    match storage.create_student(student).await {
        Ok(student) => {
            info!("Student {} registered", student.id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(student, "Student created successfully")))
        }
        Err(AttendanceError::Conflict(_)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::StudentAlreadyExists, "Student already exists"),
        )),
        Err(e) => Ok(error_response(&e, ErrorCode::RosterCreationFailed)),
    }
}

pub async fn create_teacher(
    service: &RosterService,
    request: &HttpRequest,
    teacher: CreateTeacherRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.create_teacher(teacher).await {
        Ok(teacher) => {
            info!("Teacher {} registered", teacher.id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(teacher, "Teacher created successfully")))
        }
        Err(AttendanceError::Conflict(_)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::TeacherAlreadyExists, "Teacher already exists"),
        )),
        Err(e) => Ok(error_response(&e, ErrorCode::RosterCreationFailed)),
    }
}
