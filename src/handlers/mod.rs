pub mod auth;
pub mod certificates;
pub mod courses;
pub mod dashboard;
pub mod newsletter;
pub mod pages;
pub mod services;
pub mod settings;
pub mod student;
pub mod students;

use actix_web::{get, web::{self, Json}, HttpMessage, HttpRequest, Responder};

use crate::{errors::AppError, schema::{public::HealthResponse, SessionUser}, GlobalState};

#[get("/health")]
pub async fn health(data:web::Data<GlobalState>) -> impl Responder{
    Json(HealthResponse{
        status: "ok".to_string(),
        store: data.store.backend().to_string(),
    })
}

/// The session the role guard attached to this request.
pub fn session(req:&HttpRequest) -> Result<SessionUser, AppError>{
    req.extensions()
        .get::<SessionUser>()
        .cloned()
        .ok_or_else(|| AppError::Forbidden("session missing".to_string()))
}

/// Parses an optional status filter; empty and `all` mean no filter.
pub fn parse_status<T>(raw:Option<&str>) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr<Err = AppError>,
{
    crate::models::filter_value(raw).map(str::parse).transpose()
}

#[cfg(test)]
mod tests{
    use actix_web::test::{self, TestRequest};

    use crate::models::student::StudentStatus;

    use super::*;

    #[actix_web::test]
    async fn test_health(){
        let (app, _ctx) = crate::test_init_app::init().await;

        let req = TestRequest::get().uri("/api/health").to_request();
        let res: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(res.status, "ok");
        assert_eq!(res.store, "memory");
    }

    #[actix_web::test]
    async fn test_unknown_api_route_is_json_404(){
        let (app, _ctx) = crate::test_init_app::init().await;

        let req = TestRequest::get().uri("/api/nothing-here").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 404);
        let body: crate::errors::CustomError = test::read_body_json(res).await;
        assert!(body.error.contains("/api/nothing-here"));
    }

    #[test]
    fn status_filter_parsing(){
        assert_eq!(parse_status::<StudentStatus>(None).unwrap(), None);
        assert_eq!(parse_status::<StudentStatus>(Some("all")).unwrap(), None);
        assert_eq!(parse_status::<StudentStatus>(Some("paused")).unwrap(), Some(StudentStatus::Paused));
        assert!(parse_status::<StudentStatus>(Some("sleeping")).is_err());
    }
}
