use std::collections::{hash_map::Entry, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    errors::AppError,
    mock_data,
    models::{
        certificate::{Certificate, CertificateFilter, CertificateStatus, NewCertificate},
        course::{Course, CourseChanges, CourseFilter, CourseStatus, NewCourse},
        newsletter::{NewsletterSubscriber, Page, SubscribeOutcome},
        progress::ModuleProgress,
        service::{NewService, Service, ServiceChanges, ServiceFilter},
        settings::{SettingsChanges, SiteSettings},
        student::{NewStudent, Student, StudentChanges, StudentFilter, StudentStatus},
        user::{Role, UserAccount},
    },
};

use super::{demo_accounts, Store};

/// Monotonic id source; ids are never reused after a delete.
#[derive(Debug)]
struct Sequence(u64);

impl Sequence {
    fn after<'a>(ids: impl Iterator<Item = &'a String>) -> Self {
        Sequence(ids.filter_map(|id| id.parse::<u64>().ok()).max().unwrap_or(0))
    }

    fn next(&mut self) -> String {
        self.0 += 1;
        self.0.to_string()
    }
}

struct Tables {
    students: Vec<Student>,
    courses: Vec<Course>,
    services: Vec<Service>,
    certificates: Vec<Certificate>,
    subscribers: Vec<NewsletterSubscriber>,
    settings: SiteSettings,
    accounts: HashMap<String, UserAccount>,
    progress: HashMap<String, Vec<ModuleProgress>>,
    student_ids: Sequence,
    course_ids: Sequence,
    service_ids: Sequence,
    certificate_ids: Sequence,
    subscriber_ids: Sequence,
}

/// Process-local store. Data lives as long as the server does.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn seeded() -> Self {
        let students = mock_data::students();
        let courses = mock_data::courses();
        let services = mock_data::services();
        let subscribers = mock_data::subscribers();

        let accounts = demo_accounts()
            .iter()
            .map(|account| (account.email.clone(), account.clone()))
            .collect();

        let mut progress: HashMap<String, Vec<ModuleProgress>> = HashMap::new();
        for (email, record) in mock_data::module_progress() {
            progress.entry(email).or_default().push(record);
        }

        let tables = Tables {
            student_ids: Sequence::after(students.iter().map(|s| &s.id)),
            course_ids: Sequence::after(courses.iter().map(|c| &c.id)),
            service_ids: Sequence::after(services.iter().map(|s| &s.id)),
            certificate_ids: Sequence(0),
            subscriber_ids: Sequence::after(subscribers.iter().map(|s| &s.id)),
            students,
            courses,
            services,
            certificates: Vec::new(),
            subscribers,
            settings: mock_data::settings(),
            accounts,
            progress,
        };

        MemoryStore { tables: RwLock::new(tables) }
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &str, key: impl Fn(&T) -> &str) -> bool {
    let before = items.len();
    items.retain(|item| key(item) != id);
    items.len() != before
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.students.iter().filter(|s| filter.matches(s)).cloned().collect())
    }

    async fn get_student(&self, id: &str) -> Result<Option<Student>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.students.iter().find(|s| s.id == id).cloned())
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.students.iter().find(|s| s.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn create_student(&self, student: NewStudent) -> Result<Student, AppError> {
        let mut tables = self.tables.write().await;

        if tables.students.iter().any(|s| s.email.eq_ignore_ascii_case(&student.email)) {
            return Err(AppError::bad_request("Email already exists"));
        }

        let record = Student {
            id: tables.student_ids.next(),
            name: student.name,
            email: student.email,
            course: student.course,
            enrollment_date: student.enrollment_date,
            progress: 0,
            status: StudentStatus::Active,
            certificate_url: None,
        };

        tables.students.push(record.clone());
        Ok(record)
    }

    async fn update_student(&self, id: &str, changes: StudentChanges) -> Result<Option<Student>, AppError> {
        let mut tables = self.tables.write().await;

        Ok(tables.students.iter_mut().find(|s| s.id == id).map(|student| {
            changes.apply(student);
            student.clone()
        }))
    }

    async fn delete_student(&self, id: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.students, id, |s| &s.id))
    }

    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.courses.iter().filter(|c| filter.matches(c)).cloned().collect())
    }

    async fn get_course(&self, id: &str) -> Result<Option<Course>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn find_course_by_title(&self, title: &str) -> Result<Option<Course>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.courses.iter().find(|c| c.title.eq_ignore_ascii_case(title)).cloned())
    }

    async fn create_course(&self, course: NewCourse) -> Result<Course, AppError> {
        let mut tables = self.tables.write().await;

        let record = Course {
            id: tables.course_ids.next(),
            title: course.title,
            description: course.description,
            duration: course.duration,
            price: course.price,
            max_students: course.max_students,
            current_students: 0,
            status: CourseStatus::Draft,
            instructor: course.instructor,
            modules: course.modules,
        };

        tables.courses.push(record.clone());
        Ok(record)
    }

    async fn update_course(&self, id: &str, changes: CourseChanges) -> Result<Option<Course>, AppError> {
        let mut tables = self.tables.write().await;

        Ok(tables.courses.iter_mut().find(|c| c.id == id).map(|course| {
            changes.apply(course);
            course.clone()
        }))
    }

    async fn delete_course(&self, id: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.courses, id, |c| &c.id))
    }

    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.services.iter().filter(|s| filter.matches(s)).cloned().collect())
    }

    async fn get_service(&self, id: &str) -> Result<Option<Service>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.services.iter().find(|s| s.id == id).cloned())
    }

    async fn create_service(&self, service: NewService) -> Result<Service, AppError> {
        let mut tables = self.tables.write().await;

        let record = Service {
            id: tables.service_ids.next(),
            title: service.title,
            description: service.description,
            category: service.category,
            price: service.price,
            duration: service.duration,
            image: service.image,
            is_active: true,
        };

        tables.services.push(record.clone());
        Ok(record)
    }

    async fn update_service(&self, id: &str, changes: ServiceChanges) -> Result<Option<Service>, AppError> {
        let mut tables = self.tables.write().await;

        Ok(tables.services.iter_mut().find(|s| s.id == id).map(|service| {
            changes.apply(service);
            service.clone()
        }))
    }

    async fn delete_service(&self, id: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.services, id, |s| &s.id))
    }

    async fn list_certificates(&self, filter: &CertificateFilter) -> Result<Vec<Certificate>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.certificates.iter().filter(|c| filter.matches(c)).cloned().collect())
    }

    async fn create_certificate(&self, certificate: NewCertificate) -> Result<Certificate, AppError> {
        let mut tables = self.tables.write().await;

        let record = Certificate {
            id: tables.certificate_ids.next(),
            student_id: certificate.student_id,
            student_name: certificate.student_name,
            course_name: certificate.course_name,
            completion_date: certificate.completion_date,
            status: CertificateStatus::Issued,
            certificate_url: certificate.certificate_url,
            generated_by: certificate.generated_by,
        };

        tables.certificates.push(record.clone());
        Ok(record)
    }

    async fn set_certificate_status(&self, id: &str, status: CertificateStatus) -> Result<Option<Certificate>, AppError> {
        let mut tables = self.tables.write().await;

        Ok(tables.certificates.iter_mut().find(|c| c.id == id).map(|cert| {
            cert.status = status;
            cert.clone()
        }))
    }

    async fn subscribe(&self, email: &str, name: Option<String>) -> Result<SubscribeOutcome, AppError> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables.subscribers.iter_mut().find(|s| s.email.eq_ignore_ascii_case(email)) {
            if existing.is_active {
                return Ok(SubscribeOutcome::AlreadyActive);
            }

            existing.is_active = true;
            existing.unsubscribed_at = None;
            if name.is_some() {
                existing.name = name;
            }
            return Ok(SubscribeOutcome::Reactivated(existing.clone()));
        }

        let record = NewsletterSubscriber {
            id: tables.subscriber_ids.next(),
            email: email.to_string(),
            name,
            is_active: true,
            subscribed_at: Utc::now(),
            unsubscribed_at: None,
        };

        tables.subscribers.push(record.clone());
        Ok(SubscribeOutcome::Created(record))
    }

    async fn unsubscribe(&self, email: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;

        match tables.subscribers.iter_mut().find(|s| s.email.eq_ignore_ascii_case(email) && s.is_active) {
            Some(subscriber) => {
                subscriber.is_active = false;
                subscriber.unsubscribed_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_subscribers(&self, page: Page) -> Result<(Vec<NewsletterSubscriber>, i64), AppError> {
        let active = self.active_subscribers().await?;
        let total = active.len() as i64;

        let window = active
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit).unwrap_or(0))
            .collect();

        Ok((window, total))
    }

    async fn active_subscribers(&self) -> Result<Vec<NewsletterSubscriber>, AppError> {
        let tables = self.tables.read().await;

        let mut active: Vec<NewsletterSubscriber> =
            tables.subscribers.iter().filter(|s| s.is_active).cloned().collect();
        active.sort_by(|a, b| b.subscribed_at.cmp(&a.subscribed_at));

        Ok(active)
    }

    async fn get_settings(&self) -> Result<SiteSettings, AppError> {
        Ok(self.tables.read().await.settings.clone())
    }

    async fn update_settings(&self, changes: SettingsChanges) -> Result<SiteSettings, AppError> {
        let mut tables = self.tables.write().await;
        changes.apply(&mut tables.settings, Utc::now());
        Ok(tables.settings.clone())
    }

    async fn find_account(&self, email: &str) -> Result<Option<UserAccount>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.get(&email.to_lowercase()).cloned())
    }

    async fn create_account(&self, account: UserAccount) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;

        match tables.accounts.entry(account.email.to_lowercase()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(account);
                Ok(true)
            }
        }
    }

    async fn move_student_login(&self, from: &str, to: &str) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let (from, to) = (from.to_lowercase(), to.to_lowercase());

        if from == to || tables.accounts.contains_key(&to) {
            return Ok(());
        }

        if tables.accounts.get(&from).is_some_and(|a| a.role == Role::Student) {
            if let Some(mut account) = tables.accounts.remove(&from) {
                account.email = to.clone();
                tables.accounts.insert(to.clone(), account);
            }
        }

        if let Some(records) = tables.progress.remove(&from) {
            tables.progress.insert(to, records);
        }

        Ok(())
    }

    async fn remove_student_login(&self, email: &str) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let email = email.to_lowercase();

        if tables.accounts.get(&email).is_some_and(|a| a.role == Role::Student) {
            tables.accounts.remove(&email);
        }
        tables.progress.remove(&email);

        Ok(())
    }

    async fn module_progress(&self, email: &str) -> Result<Vec<ModuleProgress>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.progress.get(&email.to_lowercase()).cloned().unwrap_or_default())
    }

    async fn save_module_progress(&self, email: &str, progress: ModuleProgress) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let records = tables.progress.entry(email.to_lowercase()).or_default();

        match records.iter_mut().find(|r| r.module_id == progress.module_id) {
            Some(existing) => *existing = progress,
            None => records.push(progress),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::seeded();
        let new = |title: &str| NewService {
            title: title.to_string(),
            description: String::new(),
            category: "Hair".to_string(),
            price: None,
            duration: None,
            image: None,
        };

        let first = store.create_service(new("Blow Dry")).await.unwrap();
        assert!(store.delete_service(&first.id).await.unwrap());

        let second = store.create_service(new("Updo")).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[actix_web::test]
    async fn subscribe_is_an_upsert() {
        let store = MemoryStore::seeded();

        assert!(matches!(store.subscribe("new@example.com", None).await.unwrap(), SubscribeOutcome::Created(_)));
        assert!(matches!(store.subscribe("NEW@example.com", None).await.unwrap(), SubscribeOutcome::AlreadyActive));

        assert!(store.unsubscribe("new@example.com").await.unwrap());
        match store.subscribe("new@example.com", Some("Nina".to_string())).await.unwrap() {
            SubscribeOutcome::Reactivated(sub) => {
                assert!(sub.is_active);
                assert_eq!(sub.name.as_deref(), Some("Nina"));
            }
            other => panic!("expected reactivation, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn existing_accounts_are_never_overwritten() {
        let store = MemoryStore::seeded();
        let takeover = UserAccount {
            email: "ADMIN@thefringe.com".to_string(),
            password_hash: "not-a-hash".to_string(),
            role: Role::Student,
        };

        assert!(!store.create_account(takeover).await.unwrap());
        let admin = store.find_account("admin@thefringe.com").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_ne!(admin.password_hash, "not-a-hash");
    }

    #[actix_web::test]
    async fn student_login_follows_the_record() {
        let store = MemoryStore::seeded();

        store.move_student_login("john@example.com", "Johnny@Example.com").await.unwrap();
        assert!(store.find_account("john@example.com").await.unwrap().is_none());
        assert_eq!(store.find_account("johnny@example.com").await.unwrap().unwrap().email, "johnny@example.com");
        assert_eq!(store.module_progress("johnny@example.com").await.unwrap().len(), 3);
        assert!(store.module_progress("john@example.com").await.unwrap().is_empty());

        store.remove_student_login("johnny@example.com").await.unwrap();
        store.remove_student_login("admin@thefringe.com").await.unwrap();
        assert!(store.find_account("johnny@example.com").await.unwrap().is_none());
        assert!(store.module_progress("johnny@example.com").await.unwrap().is_empty());
        assert!(store.find_account("admin@thefringe.com").await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn subscriber_pages_are_newest_first() {
        let store = MemoryStore::seeded();

        let (page, total) = store.list_subscribers(Page::new(Some(2), Some(2))).await.unwrap();

        assert_eq!(total, 5);
        let emails: Vec<_> = page.iter().map(|s| s.email.as_str()).collect();
        assert_eq!(emails, vec!["jessica@example.com", "amanda@example.com"]);
    }
}
