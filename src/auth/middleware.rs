use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::filter::{select_token, Access, AuthorizationFilter};
use crate::auth::token::Identity;
use crate::error::AppError;
use crate::models::Role;

/// Guards a scope or resource with the `AuthorizationFilter` registered as app data.
///
/// On admission the verified `Identity` is inserted into the request
/// extensions; on rejection the request is answered directly with the
/// corresponding `AppError` response and never reaches the handler.
#[derive(Debug, Clone, Copy)]
pub struct RequireRole {
    access: Access,
}

impl RequireRole {
    /// Any valid token.
    pub fn authenticated() -> Self {
        Self {
            access: Access::Authenticated,
        }
    }

    pub fn role(role: Role) -> Self {
        Self {
            access: Access::Role(role),
        }
    }

    pub fn admin() -> Self {
        Self::role(Role::Admin)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireRoleMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service,
            access: self.access,
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: S,
    access: Access,
}

impl<S> RequireRoleMiddleware<S> {
    fn admit(&self, req: &ServiceRequest) -> Result<Identity, AppError> {
        let filter = req
            .app_data::<web::Data<AuthorizationFilter>>()
            .ok_or_else(|| AppError::Internal("authorization filter not configured".into()))?;

        let cookie = req.cookie(filter.cookie_name());
        let token = select_token(
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok()),
            cookie.as_ref().map(|c| c.value()),
        );

        filter.admit(token, self.access)
    }
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.admit(&req) {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                let response = req
                    .into_response(app_err.error_response())
                    .map_into_right_body::<B>();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}
