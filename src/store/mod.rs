//! Record storage. Handlers only see the [`Store`] trait; the backend is picked at
//! startup from `DATABASE_URL`.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;

use crate::{
    config::Config,
    errors::AppError,
    mock_data,
    models::{
        certificate::{Certificate, CertificateFilter, CertificateStatus, NewCertificate},
        course::{Course, CourseChanges, CourseFilter, NewCourse},
        newsletter::{NewsletterSubscriber, Page, SubscribeOutcome},
        progress::ModuleProgress,
        service::{NewService, Service, ServiceChanges, ServiceFilter},
        settings::{SettingsChanges, SiteSettings},
        student::{NewStudent, Student, StudentChanges, StudentFilter},
        user::UserAccount,
    },
    utils::hash_password,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type SharedStore = Arc<dyn Store>;

#[async_trait]
pub trait Store: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, AppError>;
    async fn get_student(&self, id: &str) -> Result<Option<Student>, AppError>;
    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, AppError>;
    async fn create_student(&self, student: NewStudent) -> Result<Student, AppError>;
    async fn update_student(&self, id: &str, changes: StudentChanges) -> Result<Option<Student>, AppError>;
    async fn delete_student(&self, id: &str) -> Result<bool, AppError>;

    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, AppError>;
    async fn get_course(&self, id: &str) -> Result<Option<Course>, AppError>;
    async fn find_course_by_title(&self, title: &str) -> Result<Option<Course>, AppError>;
    async fn create_course(&self, course: NewCourse) -> Result<Course, AppError>;
    async fn update_course(&self, id: &str, changes: CourseChanges) -> Result<Option<Course>, AppError>;
    async fn delete_course(&self, id: &str) -> Result<bool, AppError>;

    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>, AppError>;
    async fn get_service(&self, id: &str) -> Result<Option<Service>, AppError>;
    async fn create_service(&self, service: NewService) -> Result<Service, AppError>;
    async fn update_service(&self, id: &str, changes: ServiceChanges) -> Result<Option<Service>, AppError>;
    async fn delete_service(&self, id: &str) -> Result<bool, AppError>;

    async fn list_certificates(&self, filter: &CertificateFilter) -> Result<Vec<Certificate>, AppError>;
    async fn create_certificate(&self, certificate: NewCertificate) -> Result<Certificate, AppError>;
    async fn set_certificate_status(&self, id: &str, status: CertificateStatus) -> Result<Option<Certificate>, AppError>;

    async fn subscribe(&self, email: &str, name: Option<String>) -> Result<SubscribeOutcome, AppError>;
    async fn unsubscribe(&self, email: &str) -> Result<bool, AppError>;
    /// One page of active subscribers, newest first, plus the total active count.
    async fn list_subscribers(&self, page: Page) -> Result<(Vec<NewsletterSubscriber>, i64), AppError>;
    async fn active_subscribers(&self) -> Result<Vec<NewsletterSubscriber>, AppError>;

    async fn get_settings(&self) -> Result<SiteSettings, AppError>;
    async fn update_settings(&self, changes: SettingsChanges) -> Result<SiteSettings, AppError>;

    async fn find_account(&self, email: &str) -> Result<Option<UserAccount>, AppError>;
    /// Adds a login unless one already exists for the email. Returns whether it was added;
    /// an existing account is never touched.
    async fn create_account(&self, account: UserAccount) -> Result<bool, AppError>;
    /// Re-keys a student's login and module progress after an email change.
    async fn move_student_login(&self, from: &str, to: &str) -> Result<(), AppError>;
    /// Drops a student's login and module progress. Admin accounts are left alone.
    async fn remove_student_login(&self, email: &str) -> Result<(), AppError>;

    async fn module_progress(&self, email: &str) -> Result<Vec<ModuleProgress>, AppError>;
    async fn save_module_progress(&self, email: &str, progress: ModuleProgress) -> Result<(), AppError>;
}

/// Opens the PostgreSQL store when a database URL is configured, otherwise the
/// in-memory store seeded with the mock records.
pub async fn connect(config: &Config) -> Result<SharedStore, AppError> {
    match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, serving the seeded in-memory store");
            Ok(Arc::new(MemoryStore::seeded()))
        }
    }
}

/// The demo accounts with hashed passwords. Hashing is slow, so it happens once per
/// process.
pub fn demo_accounts() -> &'static [UserAccount] {
    static ACCOUNTS: OnceLock<Vec<UserAccount>> = OnceLock::new();

    ACCOUNTS.get_or_init(|| {
        mock_data::DEMO_ACCOUNTS
            .iter()
            .filter_map(|(email, password, role)| match hash_password(password) {
                Ok(password_hash) => Some(UserAccount {
                    email: email.to_string(),
                    password_hash,
                    role: *role,
                }),
                Err(e) => {
                    tracing::error!(%email, error = %e, "could not hash demo account password");
                    None
                }
            })
            .collect()
    })
}
