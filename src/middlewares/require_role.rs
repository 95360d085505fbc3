/*!
 * 基于角色的访问控制中间件
 *
 * 认证由上游网关完成，网关通过 `X-Actor-Id` 与 `X-Actor-Role` 请求头传入调用者身份。
 * 此中间件解析这两个请求头，校验角色后把 [`Actor`] 放入请求扩展，供服务层做进一步的能力校验。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::RequireRole;
 * use crate::models::actors::ActorRole;
 *
 * web::scope("/api/v1/books")
 *     .route(
 *         "",
 *         web::post()
 *             .to(create_book)
 *             .wrap(RequireRole::new(&ActorRole::Admin)),
 *     )
 *     .route(
 *         "",
 *         web::get()
 *             .to(list_books)
 *             .wrap(RequireRole::new_any(ActorRole::all_roles())), // 任一角色即可
 *     );
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{
    ErrorCode,
    actors::{Actor, ActorRole},
};

use super::create_error_response;

pub const ACTOR_ID_HEADER: &str = "X-Actor-Id";
pub const ACTOR_ROLE_HEADER: &str = "X-Actor-Role";

#[derive(Clone)]
pub struct RequireRole {
    required_roles: Vec<ActorRole>,
}

impl RequireRole {
    /// 创建需要特定角色的中间件
    pub fn new(role: &ActorRole) -> Self {
        Self {
            required_roles: vec![role.clone()],
        }
    }

    /// 创建需要任一角色的中间件
    pub fn new_any(roles: &[&ActorRole]) -> Self {
        Self {
            required_roles: roles.iter().map(|r| (*r).clone()).collect(),
        }
    }

    /// 从请求扩展中获取中间件写入的调用者
    pub fn extract_actor(req: &HttpRequest) -> Option<Actor> {
        req.extensions().get::<Actor>().cloned()
    }
}

/// 解析身份请求头
fn parse_actor(req: &ServiceRequest) -> Result<Actor, &'static str> {
    let id = req
        .headers()
        .get(ACTOR_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or("Missing actor identity")?;

    let role = req
        .headers()
        .get(ACTOR_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or("Missing actor role")?
        .parse::<ActorRole>()
        .map_err(|_| "Invalid actor role")?;

    Ok(Actor {
        id: id.to_string(),
        role,
    })
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required_roles: self.required_roles.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required_roles: Vec<ActorRole>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let required_roles = self.required_roles.clone();

        Box::pin(async move {
            let actor = match parse_actor(&req) {
                Ok(actor) => actor,
                Err(reason) => {
                    info!("Role check failed for {}: {}", req.path(), reason);
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            reason,
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            if required_roles.contains(&actor.role) {
                req.extensions_mut().insert(actor);
                let res = srv.call(req).await?.map_into_left_body();
                Ok(res)
            } else {
                info!(
                    "Access denied for actor {} (role: {}). Required roles: {:?}",
                    actor.id, actor.role, required_roles
                );
                Ok(req.into_response(
                    create_error_response(
                        StatusCode::FORBIDDEN,
                        ErrorCode::Forbidden,
                        "Access denied.",
                    )
                    .map_into_right_body(),
                ))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match RequireRole::extract_actor(&req) {
            Some(actor) => HttpResponse::Ok().body(format!("{}:{}", actor.id, actor.role)),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    async fn call_with(headers: &[(&str, &str)]) -> (StatusCode, String) {
        let app = test::init_service(
            App::new().route(
                "/",
                web::get()
                    .to(whoami)
                    .wrap(RequireRole::new_any(ActorRole::marking_roles())),
            ),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/");
        for (name, value) in headers {
            req = req.insert_header((*name, *value));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        (status, String::from_utf8_lossy(&body).to_string())
    }

    #[actix_web::test]
    async fn test_allowed_role_passes_actor_through() {
        let (status, body) =
            call_with(&[(ACTOR_ID_HEADER, "t1"), (ACTOR_ROLE_HEADER, "Teacher")]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "t1:teacher");
    }

    #[actix_web::test]
    async fn test_wrong_role_is_forbidden() {
        let (status, _) = call_with(&[(ACTOR_ID_HEADER, "h1"), (ACTOR_ROLE_HEADER, "hod")]).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_missing_identity_is_unauthorized() {
        let (status, _) = call_with(&[(ACTOR_ROLE_HEADER, "admin")]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call_with(&[(ACTOR_ID_HEADER, "a1"), (ACTOR_ROLE_HEADER, "root")]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
