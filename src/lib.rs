use actix_web::{middleware::from_fn, web, HttpRequest, HttpResponse};

use config::Config;
use errors::AppError;
use handlers::{auth, certificates, courses, dashboard, newsletter, pages, services, settings, student, students};
use mailer::SharedMailer;
use store::SharedStore;

pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod mailer;
pub mod middlewares;
pub mod mock_data;
pub mod models;
pub mod schema;
pub mod store;
pub mod utils;

#[cfg(test)]
mod test_init_app;

pub struct GlobalState{
    pub store: SharedStore,
    pub mailer: SharedMailer,
    pub config: Config,
}

/// Registers every route. `web::Data<GlobalState>` has to be added at the `App` level
/// since the role guards read it from the request.
pub fn configure(cfg: &mut web::ServiceConfig){
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(
            web::scope("/api")
            .service(handlers::health)
            .service(
                web::scope("/auth")
                .service(auth::admin_login)
                .service(auth::student_login)
                .service(auth::logout)
            )
            .service(
                web::scope("/admin")
                .wrap(from_fn(middlewares::admin::admin_middleware))
                .service(dashboard::admin_dashboard)
                .service(
                    web::scope("/students")
                    .service(students::list_students)
                    .service(students::create_student)
                    .service(students::update_student)
                    .service(students::patch_student)
                    .service(students::delete_student)
                )
                .service(
                    web::scope("/courses")
                    .service(courses::list_courses)
                    .service(courses::create_course)
                    .service(courses::update_course)
                    .service(courses::patch_course)
                    .service(courses::delete_course)
                )
                .service(
                    web::scope("/services")
                    .service(services::list_services)
                    .service(services::create_service)
                    .service(services::update_service)
                    .service(services::patch_service)
                    .service(services::delete_service)
                )
                .service(
                    // literal paths before /{id}
                    web::scope("/certificates")
                    .service(certificates::list_certificates)
                    .service(certificates::eligible_students)
                    .service(certificates::upload_certificate)
                    .service(certificates::revoke_certificate)
                )
                .service(
                    web::scope("/newsletter")
                    .service(newsletter::list_subscribers)
                    .service(newsletter::export_subscribers)
                )
                .service(
                    web::scope("/settings")
                    .service(settings::update_settings)
                    .service(settings::toggle_prices)
                )
            )
            .service(
                web::scope("/student")
                .wrap(from_fn(middlewares::student::student_middleware))
                .service(student::dashboard)
                .service(student::report_progress)
                .service(student::my_certificates)
            )
            .service(web::scope("/services").service(services::public_services))
            .service(
                web::scope("/courses")
                .service(courses::public_courses)
                .service(courses::public_course)
            )
            .service(
                web::scope("/newsletter")
                .service(newsletter::subscribe)
                .service(newsletter::unsubscribe)
            )
            .service(settings::public_settings)
            .default_service(web::to(api_not_found))
        )
        .service(
            web::scope("")
            .wrap(from_fn(middlewares::pages::page_guard))
            .default_service(web::to(pages::serve_page))
        );
}

async fn api_not_found(req: HttpRequest) -> Result<HttpResponse, AppError>{
    Err(AppError::NotFound(format!("No route for {} {}", req.method(), req.path())))
}

fn json_config() -> web::JsonConfig{
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::bad_request(err.to_string()).into())
}

fn query_config() -> web::QueryConfig{
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::bad_request(err.to_string()).into())
}

fn path_config() -> web::PathConfig{
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::bad_request(err.to_string()).into())
}
