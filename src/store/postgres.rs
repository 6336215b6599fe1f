use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, Pool, Postgres};

use crate::{
    errors::AppError,
    mock_data,
    models::{
        certificate::{Certificate, CertificateFilter, CertificateStatus, NewCertificate},
        course::{Course, CourseChanges, CourseFilter, CourseModule, NewCourse},
        newsletter::{NewsletterSubscriber, Page, SubscribeOutcome},
        progress::ModuleProgress,
        service::{NewService, Service, ServiceChanges, ServiceFilter},
        settings::{SettingsChanges, SiteSettings, SocialLinks},
        student::{NewStudent, Student, StudentChanges, StudentFilter},
        user::{Role, UserAccount},
    },
};

use super::{demo_accounts, Store};

const STUDENT_COLUMNS: &str =
    "id::text AS id, name, email, course, enrollment_date, progress, status, certificate_url";
const COURSE_COLUMNS: &str =
    "id::text AS id, title, description, duration, price, max_students, current_students, status, instructor, modules";
const SERVICE_COLUMNS: &str =
    "id::text AS id, title, description, category, price, duration, image, is_active";
const CERTIFICATE_COLUMNS: &str =
    "id::text AS id, student_id, student_name, course_name, completion_date, status, certificate_url, generated_by";
const SUBSCRIBER_COLUMNS: &str =
    "id::text AS id, email, name, is_active, subscribed_at, unsubscribed_at";
const SETTINGS_COLUMNS: &str =
    "show_prices, site_name, contact_email, contact_phone, address, social_media, updated_at";
const PROGRESS_COLUMNS: &str = "module_id, progress, last_position, completed, updated_at";

const SEEDED_TABLES: &[&str] = &["students", "courses", "services", "newsletter_subscribers"];

pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|_e| AppError::DbConnect)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "migrations failed");
                AppError::DbConnect
            })?;

        let store = PgStore { pool };
        store.seed().await?;

        Ok(store)
    }

    /// First start on an empty database: the demo logins plus the same records the
    /// in-memory store begins with. Later starts find the accounts and skip this.
    async fn seed(&self) -> Result<(), AppError> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_accounts")
            .fetch_one(&self.pool)
            .await?;

        if existing > 0 {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for account in demo_accounts() {
            sqlx::query("INSERT INTO user_accounts (email, password_hash, role) VALUES (lower($1), $2, $3) ON CONFLICT (email) DO NOTHING")
                .bind(&account.email)
                .bind(&account.password_hash)
                .bind(account.role.as_str())
                .execute(&mut *tx)
                .await?;
        }

        for student in mock_data::students() {
            sqlx::query(
                r#"
                    INSERT INTO students (id, name, email, course, enrollment_date, progress, status, certificate_url)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    ON CONFLICT DO NOTHING
                "#,
            )
            .bind(parse_id(&student.id))
            .bind(&student.name)
            .bind(&student.email)
            .bind(&student.course)
            .bind(student.enrollment_date)
            .bind(student.progress)
            .bind(student.status.as_str())
            .bind(&student.certificate_url)
            .execute(&mut *tx)
            .await?;
        }

        for course in mock_data::courses() {
            sqlx::query(
                r#"
                    INSERT INTO courses (id, title, description, duration, price, max_students, current_students, status, instructor, modules)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    ON CONFLICT DO NOTHING
                "#,
            )
            .bind(parse_id(&course.id))
            .bind(&course.title)
            .bind(&course.description)
            .bind(&course.duration)
            .bind(course.price)
            .bind(course.max_students)
            .bind(course.current_students)
            .bind(course.status.as_str())
            .bind(&course.instructor)
            .bind(Json(&course.modules))
            .execute(&mut *tx)
            .await?;
        }

        for service in mock_data::services() {
            sqlx::query(
                r#"
                    INSERT INTO services (id, title, description, category, price, duration, image, is_active)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    ON CONFLICT DO NOTHING
                "#,
            )
            .bind(parse_id(&service.id))
            .bind(&service.title)
            .bind(&service.description)
            .bind(&service.category)
            .bind(service.price)
            .bind(&service.duration)
            .bind(&service.image)
            .bind(service.is_active)
            .execute(&mut *tx)
            .await?;
        }

        for subscriber in mock_data::subscribers() {
            sqlx::query(
                r#"
                    INSERT INTO newsletter_subscribers (id, email, name, is_active, subscribed_at)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT DO NOTHING
                "#,
            )
            .bind(parse_id(&subscriber.id))
            .bind(&subscriber.email)
            .bind(&subscriber.name)
            .bind(subscriber.is_active)
            .bind(subscriber.subscribed_at)
            .execute(&mut *tx)
            .await?;
        }

        for (email, record) in mock_data::module_progress() {
            sqlx::query(
                r#"
                    INSERT INTO module_progress (student_email, module_id, progress, last_position, completed, updated_at)
                    VALUES (lower($1), $2, $3, $4, $5, $6)
                    ON CONFLICT DO NOTHING
                "#,
            )
            .bind(&email)
            .bind(&record.module_id)
            .bind(record.progress)
            .bind(record.last_position)
            .bind(record.completed)
            .bind(record.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        // explicit ids leave the sequences behind
        for table in SEEDED_TABLES {
            sqlx::query(&format!(
                "SELECT setval(pg_get_serial_sequence('{0}', 'id'), (SELECT COALESCE(MAX(id), 0) + 1 FROM {0}), false)",
                table
            ))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(accounts = demo_accounts().len(), "seeded demo accounts and records");

        Ok(())
    }
}

/// Non-numeric ids cannot exist in a BIGSERIAL column.
fn parse_id(id: &str) -> Option<i64> {
    id.parse().ok()
}

/// `%term%` for ILIKE with the wildcard characters of the term escaped.
fn like_pattern(term: &Option<String>) -> Option<String> {
    term.as_ref().map(|t| {
        let escaped = t.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

fn parse_stored<T: FromStr>(raw: &str, column: &str) -> Result<T, AppError> {
    raw.parse().map_err(|_| {
        tracing::error!(%raw, %column, "unexpected value in database");
        AppError::InternalError
    })
}

#[derive(FromRow)]
struct StudentRow {
    id: String,
    name: String,
    email: String,
    course: String,
    enrollment_date: NaiveDate,
    progress: i32,
    status: String,
    certificate_url: Option<String>,
}

impl TryFrom<StudentRow> for Student {
    type Error = AppError;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        Ok(Student {
            status: parse_stored(&row.status, "students.status")?,
            id: row.id,
            name: row.name,
            email: row.email,
            course: row.course,
            enrollment_date: row.enrollment_date,
            progress: row.progress,
            certificate_url: row.certificate_url,
        })
    }
}

#[derive(FromRow)]
struct CourseRow {
    id: String,
    title: String,
    description: String,
    duration: String,
    price: Option<i32>,
    max_students: i32,
    current_students: i32,
    status: String,
    instructor: String,
    modules: Json<Vec<CourseModule>>,
}

impl TryFrom<CourseRow> for Course {
    type Error = AppError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Ok(Course {
            status: parse_stored(&row.status, "courses.status")?,
            id: row.id,
            title: row.title,
            description: row.description,
            duration: row.duration,
            price: row.price,
            max_students: row.max_students,
            current_students: row.current_students,
            instructor: row.instructor,
            modules: row.modules.0,
        })
    }
}

#[derive(FromRow)]
struct ServiceRow {
    id: String,
    title: String,
    description: String,
    category: String,
    price: Option<i32>,
    duration: Option<String>,
    image: Option<String>,
    is_active: bool,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Service {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            price: row.price,
            duration: row.duration,
            image: row.image,
            is_active: row.is_active,
        }
    }
}

#[derive(FromRow)]
struct CertificateRow {
    id: String,
    student_id: String,
    student_name: String,
    course_name: String,
    completion_date: DateTime<Utc>,
    status: String,
    certificate_url: String,
    generated_by: String,
}

impl TryFrom<CertificateRow> for Certificate {
    type Error = AppError;

    fn try_from(row: CertificateRow) -> Result<Self, Self::Error> {
        Ok(Certificate {
            status: parse_stored(&row.status, "certificates.status")?,
            id: row.id,
            student_id: row.student_id,
            student_name: row.student_name,
            course_name: row.course_name,
            completion_date: row.completion_date,
            certificate_url: row.certificate_url,
            generated_by: row.generated_by,
        })
    }
}

#[derive(FromRow)]
struct SubscriberRow {
    id: String,
    email: String,
    name: Option<String>,
    is_active: bool,
    subscribed_at: DateTime<Utc>,
    unsubscribed_at: Option<DateTime<Utc>>,
}

impl From<SubscriberRow> for NewsletterSubscriber {
    fn from(row: SubscriberRow) -> Self {
        NewsletterSubscriber {
            id: row.id,
            email: row.email,
            name: row.name,
            is_active: row.is_active,
            subscribed_at: row.subscribed_at,
            unsubscribed_at: row.unsubscribed_at,
        }
    }
}

#[derive(FromRow)]
struct SettingsRow {
    show_prices: bool,
    site_name: String,
    contact_email: String,
    contact_phone: String,
    address: String,
    social_media: Json<SocialLinks>,
    updated_at: DateTime<Utc>,
}

impl From<SettingsRow> for SiteSettings {
    fn from(row: SettingsRow) -> Self {
        SiteSettings {
            show_prices: row.show_prices,
            site_name: row.site_name,
            contact_email: row.contact_email,
            contact_phone: row.contact_phone,
            address: row.address,
            social_media: row.social_media.0,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct AccountRow {
    email: String,
    password_hash: String,
    role: String,
}

#[derive(FromRow)]
struct ProgressRow {
    module_id: String,
    progress: f64,
    last_position: f64,
    completed: bool,
    updated_at: DateTime<Utc>,
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>, AppError>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, AppError> {
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            r#"
                SELECT {} FROM students
                WHERE ($1::text IS NULL OR status = $1)
                  AND ($2::text IS NULL OR name ILIKE $2 OR email ILIKE $2 OR course ILIKE $2)
                ORDER BY id
            "#,
            STUDENT_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(like_pattern(&filter.search))
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    async fn get_student(&self, id: &str) -> Result<Option<Student>, AppError> {
        let Some(id) = parse_id(id) else { return Ok(None) };

        let row = sqlx::query_as::<_, StudentRow>(&format!("SELECT {} FROM students WHERE id = $1", STUDENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Student::try_from).transpose()
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {} FROM students WHERE lower(email) = lower($1)",
            STUDENT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Student::try_from).transpose()
    }

    async fn create_student(&self, student: NewStudent) -> Result<Student, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            r#"
                INSERT INTO students (name, email, course, enrollment_date)
                VALUES ($1, $2, $3, $4)
                RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.course)
        .bind(student.enrollment_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = e.as_database_error().is_some_and(|db| db.is_unique_violation());
            if duplicate {
                AppError::bad_request("Email already exists")
            } else {
                AppError::Database(e)
            }
        })?;

        Student::try_from(row)
    }

    async fn update_student(&self, id: &str, changes: StudentChanges) -> Result<Option<Student>, AppError> {
        let Some(id) = parse_id(id) else { return Ok(None) };

        let row = sqlx::query_as::<_, StudentRow>(&format!(
            r#"
                UPDATE students SET
                    name = COALESCE($2, name),
                    email = COALESCE($3, email),
                    course = COALESCE($4, course),
                    status = COALESCE($5, status),
                    progress = COALESCE($6, progress),
                    certificate_url = COALESCE($7, certificate_url)
                WHERE id = $1
                RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.course)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.progress)
        .bind(changes.certificate_url)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Student::try_from).transpose()
    }

    async fn delete_student(&self, id: &str) -> Result<bool, AppError> {
        let Some(id) = parse_id(id) else { return Ok(false) };

        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, AppError> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            r#"
                SELECT {} FROM courses
                WHERE ($1::text IS NULL OR status = $1)
                  AND ($2::text IS NULL OR title ILIKE $2 OR description ILIKE $2 OR instructor ILIKE $2)
                ORDER BY id
            "#,
            COURSE_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(like_pattern(&filter.search))
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    async fn get_course(&self, id: &str) -> Result<Option<Course>, AppError> {
        let Some(id) = parse_id(id) else { return Ok(None) };

        let row = sqlx::query_as::<_, CourseRow>(&format!("SELECT {} FROM courses WHERE id = $1", COURSE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Course::try_from).transpose()
    }

    async fn find_course_by_title(&self, title: &str) -> Result<Option<Course>, AppError> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {} FROM courses WHERE lower(title) = lower($1) ORDER BY id LIMIT 1",
            COURSE_COLUMNS
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Course::try_from).transpose()
    }

    async fn create_course(&self, course: NewCourse) -> Result<Course, AppError> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            r#"
                INSERT INTO courses (title, description, duration, price, max_students, instructor, modules)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {}
            "#,
            COURSE_COLUMNS
        ))
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.duration)
        .bind(course.price)
        .bind(course.max_students)
        .bind(&course.instructor)
        .bind(Json(&course.modules))
        .fetch_one(&self.pool)
        .await?;

        Course::try_from(row)
    }

    async fn update_course(&self, id: &str, changes: CourseChanges) -> Result<Option<Course>, AppError> {
        let Some(id) = parse_id(id) else { return Ok(None) };

        let row = sqlx::query_as::<_, CourseRow>(&format!(
            r#"
                UPDATE courses SET
                    title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    duration = COALESCE($4, duration),
                    price = COALESCE($5, price),
                    max_students = COALESCE($6, max_students),
                    current_students = COALESCE($7, current_students),
                    status = COALESCE($8, status),
                    instructor = COALESCE($9, instructor),
                    modules = COALESCE($10, modules)
                WHERE id = $1
                RETURNING {}
            "#,
            COURSE_COLUMNS
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.duration)
        .bind(changes.price)
        .bind(changes.max_students)
        .bind(changes.current_students)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.instructor)
        .bind(changes.modules.map(Json))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Course::try_from).transpose()
    }

    async fn delete_course(&self, id: &str) -> Result<bool, AppError> {
        let Some(id) = parse_id(id) else { return Ok(false) };

        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>, AppError> {
        let rows = sqlx::query_as::<_, ServiceRow>(&format!(
            r#"
                SELECT {} FROM services
                WHERE ($1::bool IS NULL OR is_active = $1)
                  AND ($2::text IS NULL OR category = $2)
                  AND ($3::text IS NULL OR title ILIKE $3 OR description ILIKE $3)
                ORDER BY id
            "#,
            SERVICE_COLUMNS
        ))
        .bind(filter.active)
        .bind(filter.category.as_deref())
        .bind(like_pattern(&filter.search))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Service::from).collect())
    }

    async fn get_service(&self, id: &str) -> Result<Option<Service>, AppError> {
        let Some(id) = parse_id(id) else { return Ok(None) };

        let row = sqlx::query_as::<_, ServiceRow>(&format!("SELECT {} FROM services WHERE id = $1", SERVICE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Service::from))
    }

    async fn create_service(&self, service: NewService) -> Result<Service, AppError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            r#"
                INSERT INTO services (title, description, category, price, duration, image)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {}
            "#,
            SERVICE_COLUMNS
        ))
        .bind(&service.title)
        .bind(&service.description)
        .bind(&service.category)
        .bind(service.price)
        .bind(&service.duration)
        .bind(&service.image)
        .fetch_one(&self.pool)
        .await?;

        Ok(Service::from(row))
    }

    async fn update_service(&self, id: &str, changes: ServiceChanges) -> Result<Option<Service>, AppError> {
        let Some(id) = parse_id(id) else { return Ok(None) };

        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            r#"
                UPDATE services SET
                    title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    category = COALESCE($4, category),
                    price = COALESCE($5, price),
                    duration = COALESCE($6, duration),
                    image = COALESCE($7, image),
                    is_active = COALESCE($8, is_active)
                WHERE id = $1
                RETURNING {}
            "#,
            SERVICE_COLUMNS
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.category)
        .bind(changes.price)
        .bind(changes.duration)
        .bind(changes.image)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Service::from))
    }

    async fn delete_service(&self, id: &str) -> Result<bool, AppError> {
        let Some(id) = parse_id(id) else { return Ok(false) };

        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_certificates(&self, filter: &CertificateFilter) -> Result<Vec<Certificate>, AppError> {
        let rows = sqlx::query_as::<_, CertificateRow>(&format!(
            r#"
                SELECT {} FROM certificates
                WHERE ($1::text IS NULL OR status = $1)
                  AND ($2::text IS NULL OR student_id = $2)
                  AND ($3::text IS NULL OR student_name ILIKE $3 OR course_name ILIKE $3)
                ORDER BY id
            "#,
            CERTIFICATE_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.student_id.as_deref())
        .bind(like_pattern(&filter.search))
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    async fn create_certificate(&self, certificate: NewCertificate) -> Result<Certificate, AppError> {
        let row = sqlx::query_as::<_, CertificateRow>(&format!(
            r#"
                INSERT INTO certificates (student_id, student_name, course_name, completion_date, status, certificate_url, generated_by)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {}
            "#,
            CERTIFICATE_COLUMNS
        ))
        .bind(&certificate.student_id)
        .bind(&certificate.student_name)
        .bind(&certificate.course_name)
        .bind(certificate.completion_date)
        .bind(CertificateStatus::Issued.as_str())
        .bind(&certificate.certificate_url)
        .bind(&certificate.generated_by)
        .fetch_one(&self.pool)
        .await?;

        Certificate::try_from(row)
    }

    async fn set_certificate_status(&self, id: &str, status: CertificateStatus) -> Result<Option<Certificate>, AppError> {
        let Some(id) = parse_id(id) else { return Ok(None) };

        let row = sqlx::query_as::<_, CertificateRow>(&format!(
            "UPDATE certificates SET status = $2 WHERE id = $1 RETURNING {}",
            CERTIFICATE_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Certificate::try_from).transpose()
    }

    async fn subscribe(&self, email: &str, name: Option<String>) -> Result<SubscribeOutcome, AppError> {
        let existing = sqlx::query_as::<_, SubscriberRow>(&format!(
            "SELECT {} FROM newsletter_subscribers WHERE lower(email) = lower($1)",
            SUBSCRIBER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            Some(row) if row.is_active => Ok(SubscribeOutcome::AlreadyActive),
            Some(row) => {
                let row = sqlx::query_as::<_, SubscriberRow>(&format!(
                    r#"
                        UPDATE newsletter_subscribers
                        SET is_active = TRUE, unsubscribed_at = NULL, name = COALESCE($2, name)
                        WHERE email = $1
                        RETURNING {}
                    "#,
                    SUBSCRIBER_COLUMNS
                ))
                .bind(&row.email)
                .bind(name)
                .fetch_one(&self.pool)
                .await?;

                Ok(SubscribeOutcome::Reactivated(row.into()))
            }
            None => {
                let row = sqlx::query_as::<_, SubscriberRow>(&format!(
                    "INSERT INTO newsletter_subscribers (email, name) VALUES ($1, $2) RETURNING {}",
                    SUBSCRIBER_COLUMNS
                ))
                .bind(email)
                .bind(name)
                .fetch_one(&self.pool)
                .await?;

                Ok(SubscribeOutcome::Created(row.into()))
            }
        }
    }

    async fn unsubscribe(&self, email: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
                UPDATE newsletter_subscribers
                SET is_active = FALSE, unsubscribed_at = now()
                WHERE lower(email) = lower($1) AND is_active
            "#,
        )
        .bind(email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_subscribers(&self, page: Page) -> Result<(Vec<NewsletterSubscriber>, i64), AppError> {
        let rows = sqlx::query_as::<_, SubscriberRow>(&format!(
            r#"
                SELECT {} FROM newsletter_subscribers
                WHERE is_active
                ORDER BY subscribed_at DESC, id DESC
                LIMIT $1 OFFSET $2
            "#,
            SUBSCRIBER_COLUMNS
        ))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM newsletter_subscribers WHERE is_active")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(NewsletterSubscriber::from).collect(), total))
    }

    async fn active_subscribers(&self) -> Result<Vec<NewsletterSubscriber>, AppError> {
        let rows = sqlx::query_as::<_, SubscriberRow>(&format!(
            "SELECT {} FROM newsletter_subscribers WHERE is_active ORDER BY subscribed_at DESC, id DESC",
            SUBSCRIBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(NewsletterSubscriber::from).collect())
    }

    async fn get_settings(&self) -> Result<SiteSettings, AppError> {
        let row = sqlx::query_as::<_, SettingsRow>(&format!("SELECT {} FROM site_settings WHERE id = 1", SETTINGS_COLUMNS))
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn update_settings(&self, changes: SettingsChanges) -> Result<SiteSettings, AppError> {
        let row = sqlx::query_as::<_, SettingsRow>(&format!(
            r#"
                UPDATE site_settings SET
                    show_prices = COALESCE($1, show_prices),
                    site_name = COALESCE($2, site_name),
                    contact_email = COALESCE($3, contact_email),
                    contact_phone = COALESCE($4, contact_phone),
                    address = COALESCE($5, address),
                    social_media = COALESCE($6, social_media),
                    updated_at = now()
                WHERE id = 1
                RETURNING {}
            "#,
            SETTINGS_COLUMNS
        ))
        .bind(changes.show_prices)
        .bind(changes.site_name)
        .bind(changes.contact_email)
        .bind(changes.contact_phone)
        .bind(changes.address)
        .bind(changes.social_media.map(Json))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_account(&self, email: &str) -> Result<Option<UserAccount>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT email, password_hash, role FROM user_accounts WHERE email = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(UserAccount {
                role: parse_stored(&row.role, "user_accounts.role")?,
                email: row.email,
                password_hash: row.password_hash,
            })),
            None => Ok(None),
        }
    }

    async fn create_account(&self, account: UserAccount) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
                INSERT INTO user_accounts (email, password_hash, role)
                VALUES (lower($1), $2, $3)
                ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn move_student_login(&self, from: &str, to: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
                UPDATE user_accounts SET email = lower($2)
                WHERE email = lower($1) AND role = $3
                  AND NOT EXISTS (SELECT 1 FROM user_accounts WHERE email = lower($2))
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(Role::Student.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
                UPDATE module_progress SET student_email = lower($2)
                WHERE student_email = lower($1) AND lower($1) <> lower($2)
            "#,
        )
        .bind(from)
        .bind(to)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove_student_login(&self, email: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_accounts WHERE email = lower($1) AND role = $2")
            .bind(email)
            .bind(Role::Student.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM module_progress WHERE student_email = lower($1)")
            .bind(email)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn module_progress(&self, email: &str) -> Result<Vec<ModuleProgress>, AppError> {
        let rows = sqlx::query_as::<_, ProgressRow>(&format!(
            "SELECT {} FROM module_progress WHERE student_email = lower($1) ORDER BY module_id",
            PROGRESS_COLUMNS
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ModuleProgress {
                module_id: row.module_id,
                progress: row.progress,
                last_position: row.last_position,
                completed: row.completed,
                updated_at: row.updated_at,
            })
            .collect())
    }

    async fn save_module_progress(&self, email: &str, progress: ModuleProgress) -> Result<(), AppError> {
        sqlx::query(
            r#"
                INSERT INTO module_progress (student_email, module_id, progress, last_position, completed, updated_at)
                VALUES (lower($1), $2, $3, $4, $5, $6)
                ON CONFLICT (student_email, module_id) DO UPDATE
                SET progress = EXCLUDED.progress,
                    last_position = EXCLUDED.last_position,
                    completed = EXCLUDED.completed,
                    updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(email)
        .bind(&progress.module_id)
        .bind(progress.progress)
        .bind(progress.last_position)
        .bind(progress.completed)
        .bind(progress.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
