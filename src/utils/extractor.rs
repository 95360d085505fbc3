//! 路径参数安全提取器
//!
//! 非法的路径参数直接返回统一格式的 400 响应，而不是 actix 默认的纯文本错误。

/// 定义一个从路径中提取正整数 ID 的提取器
///
/// ```rust,ignore
/// define_safe_i64_extractor!(SafeBookIdI64, "book_id");
///
/// async fn handler(book_id: SafeBookIdI64) -> HttpResponse { /* book_id.0 */ }
/// ```
#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = std::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _payload: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                let parsed = req
                    .match_info()
                    .get($param)
                    .and_then(|raw| raw.parse::<i64>().ok())
                    .filter(|id| *id > 0);

                std::future::ready(match parsed {
                    Some(id) => Ok($name(id)),
                    None => {
                        let response = actix_web::HttpResponse::BadRequest().json(
                            $crate::models::ApiResponse::error_empty(
                                $crate::models::ErrorCode::BadRequest,
                                format!("Invalid path parameter: {}", $param),
                            ),
                        );
                        Err(actix_web::error::InternalError::from_response(
                            concat!("invalid ", $param),
                            response,
                        )
                        .into())
                    }
                })
            }
        }
    };
}

define_safe_i64_extractor!(SafeBookIdI64, "book_id");

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{FromRequest, test::TestRequest};

    #[actix_web::test]
    async fn test_valid_book_id() {
        let req = TestRequest::default()
            .param("book_id", "42")
            .to_http_request();
        let id = SafeBookIdI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 42);
    }

    #[actix_web::test]
    async fn test_rejects_non_positive_and_garbage() {
        for raw in ["0", "-3", "abc", "99999999999999999999"] {
            let req = TestRequest::default()
                .param("book_id", raw)
                .to_http_request();
            assert!(SafeBookIdI64::extract(&req).await.is_err(), "{raw}");
        }
    }
}
