use std::sync::Arc;

use actix_web::{test::{self, TestRequest}, App, web, dev::ServiceResponse, http::StatusCode, Error};
use actix_service::Service;
use actix_http::Request;
use tempfile::TempDir;

use crate::{config::Config, mailer::RecordingMailer, models::user::Role, schema::{EmailAndPassword, SigninResponse}, store::MemoryStore, GlobalState};

pub const ADMIN_EMAIL: &str = "admin@thefringe.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const STUDENT_EMAIL: &str = "john@example.com";
pub const STUDENT_PASSWORD: &str = "student123";

/// Keeps the temporary public directory alive for the length of a test.
pub struct TestContext{
    pub public_dir: TempDir,
    pub state: web::Data<GlobalState>,
    pub mailer: Arc<RecordingMailer>,
}

/// The full route table over a freshly seeded in-memory store.
pub async fn init() -> (impl Service<Request, Response = ServiceResponse, Error = Error>, TestContext) {

    let public_dir = tempfile::tempdir().expect("temp public dir");
    std::fs::write(public_dir.path().join("index.html"), "<h1>The Fringe</h1>").expect("write index");

    let mailer = Arc::new(RecordingMailer::default());

    let global_state = GlobalState{
        store: Arc::new(MemoryStore::seeded()),
        mailer: mailer.clone(),
        config: Config::for_tests(public_dir.path()),
    };

    let app_data = web::Data::new(global_state);

    let app = test::init_service(
        App::new()
            .app_data(app_data.clone())
            .configure(crate::configure)
    ).await;

    (app, TestContext{ public_dir, state: app_data, mailer })
}

pub async fn login<S>(app:&S, role:Role, email:&str, password:&str) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let uri = match role {
        Role::Admin => "/api/auth/admin-login",
        Role::Student => "/api/auth/student-login",
    };

    let req = TestRequest::post()
        .uri(uri)
        .set_json(EmailAndPassword{ email: email.to_string(), password: password.to_string() })
        .to_request();

    let res: SigninResponse = test::call_and_read_body_json(app, req).await;
    res.token
}

pub async fn admin_token<S>(app:&S) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    login(app, Role::Admin, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

pub async fn student_token<S>(app:&S) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    login(app, Role::Student, STUDENT_EMAIL, STUDENT_PASSWORD).await
}

pub fn bearer(token:&str) -> (&'static str, String){
    ("Authorization", format!("Bearer {}", token))
}

/// Status of a request, including the ones the role guards turn away before any
/// handler runs.
pub async fn call_status<S>(app:&S, req:Request) -> StatusCode
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    match test::try_call_service(app, req).await{
        Ok(res) => res.status(),
        Err(err) => err.error_response().status(),
    }
}
