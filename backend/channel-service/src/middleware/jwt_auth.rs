/// Bearer token validation middleware. Resolves the caller to a trusted
/// `UserId` and stores it in request extensions; handlers never re-validate
/// credentials themselves.
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use uuid::Uuid;

use crate::security::jwt;

/// Actor id extracted from a validated JWT
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
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
        let service = self.service.clone();

        Box::pin(async move {
            // Copy the header out before touching extensions_mut; holding an
            // immutable borrow across the mutable access panics in actix-web.
            let auth_header = match req.headers().get("Authorization") {
                Some(header) => match header.to_str() {
                    Ok(h) => h.to_string(),
                    Err(_) => {
                        return Err(ErrorUnauthorized("Invalid Authorization header"));
                    }
                },
                None => {
                    return Err(ErrorUnauthorized("Missing Authorization header"));
                }
            };

            let token = match auth_header.strip_prefix("Bearer ") {
                Some(t) => t,
                None => {
                    return Err(ErrorUnauthorized(
                        "Invalid Authorization scheme, expected Bearer",
                    ));
                }
            };

            let user_id = match jwt::validate_token(token) {
                Ok(token_data) => match Uuid::parse_str(&token_data.claims.sub) {
                    Ok(id) => id,
                    Err(_) => {
                        return Err(ErrorUnauthorized("Invalid user ID in token"));
                    }
                },
                Err(e) => {
                    tracing::debug!("Token validation failed: {}", e);
                    return Err(ErrorUnauthorized("Invalid or expired token"));
                }
            };

            req.extensions_mut().insert(UserId(user_id));

            let res = service.call(req).await?;
            Ok(res)
        })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<UserId>().copied() {
            Some(user_id) => ready(Ok(user_id)),
            None => ready(Err(ErrorUnauthorized(
                "User ID missing in request extensions",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    async fn whoami(auth: UserId) -> HttpResponse {
        HttpResponse::Ok().body(auth.0.to_string())
    }

    macro_rules! test_app {
        () => {
            test::init_service(App::new().service(
                web::scope("").wrap(JwtAuthMiddleware).route("/whoami", web::get().to(whoami)),
            ))
            .await
        };
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized() {
        crate::security::jwt::initialize_secret("unit-test-secret").unwrap();
        let app = test_app!();

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let res = test::try_call_service(&app, req).await;
        assert!(res.is_err());
    }

    #[actix_web::test]
    async fn malformed_token_is_unauthorized() {
        crate::security::jwt::initialize_secret("unit-test-secret").unwrap();
        let app = test_app!();

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", "Bearer nonsense"))
            .to_request();
        let res = test::try_call_service(&app, req).await;
        assert!(res.is_err());
    }

    #[actix_web::test]
    async fn valid_token_resolves_the_actor() {
        crate::security::jwt::initialize_secret("unit-test-secret").unwrap();
        let app = test_app!();

        let user_id = Uuid::new_v4();
        let token = crate::security::jwt::generate_token(user_id, 60).unwrap();

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());

        let body = test::read_body(res).await;
        assert_eq!(&body[..], user_id.to_string().as_bytes());
    }
}
