/// Access Token Authentication Middleware
///
/// Authenticates the `Bearer` access token through the shared `AuthGate` and
/// injects the caller's identity into request extensions. A request that
/// fails authentication never reaches the wrapped handler.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::AuthGate;
use crate::error::AppError;

/// Identity of the caller, available to handlers as `web::ReqData<AuthenticatedUser>`
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Middleware for routes that require a valid access token
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = match req.app_data::<web::Data<AuthGate>>() {
            Some(gate) => gate.authenticate(req.headers()).map_err(AppError::from),
            None => {
                tracing::error!("AuthGate missing from application data");
                Err(AppError::Internal("auth gate not configured".to_string()))
            }
        };

        match outcome {
            Ok(user_id) => {
                req.extensions_mut().insert(AuthenticatedUser { user_id });
                tracing::debug!(user_id = %user_id, "Access token validated");

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => Box::pin(async move { Err(e.into()) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App, HttpResponse};
    use std::sync::Arc;

    use crate::configuration::AuthSettings;
    use crate::store::{InMemoryRefreshTokenStore, InMemoryUserStore};

    async fn whoami(identity: web::ReqData<AuthenticatedUser>) -> HttpResponse {
        HttpResponse::Ok().body(identity.user_id.to_string())
    }

    fn gate() -> web::Data<AuthGate> {
        web::Data::new(AuthGate::new(
            AuthSettings {
                secret: "middleware-secret".to_string(),
                access_token_expiry: 3600,
                refresh_token_expiry: 3600,
                api_key: "key".to_string(),
            },
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryRefreshTokenStore::new()),
        ))
    }

    #[actix_web::test]
    async fn test_valid_token_reaches_handler() {
        let user_id = Uuid::new_v4();
        let token = crate::auth::issue_access_token(
            user_id,
            "middleware-secret",
            chrono::Duration::hours(1),
        )
        .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(gate())
                .route("/me", web::get().to(whoami).wrap(AuthMiddleware)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, user_id.to_string());
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .app_data(gate())
                .route("/me", web::get().to(whoami).wrap(AuthMiddleware)),
        )
        .await;

        let req = test::TestRequest::get().uri("/me").to_request();
        let err = test::try_call_service(&app, req)
            .await
            .err()
            .expect("request without a token should fail");

        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_missing_gate_is_internal_error() {
        let app = test::init_service(
            App::new().route("/me", web::get().to(whoami).wrap(AuthMiddleware)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", "Bearer anything"))
            .to_request();
        let err = test::try_call_service(&app, req)
            .await
            .err()
            .expect("request without a configured gate should fail");

        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
