pub mod absentees;
pub mod mark;
pub mod records;
pub mod statistics;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::attendance::requests::{AbsenteeQuery, MarkSessionRequest};
use crate::storage::Storage;

pub struct AttendanceService {
    storage: Option<Arc<dyn Storage>>,
}

impl AttendanceService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 点名（整节提交，重复提交幂等）
    pub async fn mark_session(
        &self,
        request: &HttpRequest,
        book_id: i64,
        body: MarkSessionRequest,
    ) -> ActixResult<HttpResponse> {
        mark::mark_session(self, request, book_id, body).await
    }

    // 按日期、节次查看出勤表
    pub async fn get_records(
        &self,
        request: &HttpRequest,
        book_id: i64,
    ) -> ActixResult<HttpResponse> {
        records::get_records(self, request, book_id).await
    }

    // 考勤簿出勤统计
    pub async fn get_statistics(
        &self,
        request: &HttpRequest,
        book_id: i64,
    ) -> ActixResult<HttpResponse> {
        statistics::get_statistics(self, request, book_id).await
    }

    // 某日缺勤名单
    pub async fn list_absentees(
        &self,
        request: &HttpRequest,
        query: AbsenteeQuery,
    ) -> ActixResult<HttpResponse> {
        absentees::list_absentees(self, request, query).await
    }
}
