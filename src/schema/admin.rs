use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    certificate::Certificate,
    course::{Course, CourseChanges, CourseModule, CourseStatus},
    newsletter::{NewsletterSubscriber, Pagination},
    service::{Service, ServiceChanges},
    student::{Student, StudentChanges, StudentStatus},
};

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateStudent{
    pub name: String,
    pub email: String,
    pub course: String,
    pub password: Option<String>,
}

/// Body of both `PUT` and `PATCH` on a student; absent fields stay untouched.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UpdateStudent{
    pub name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    pub status: Option<StudentStatus>,
    pub progress: Option<i32>,
}

impl From<UpdateStudent> for StudentChanges{
    fn from(update: UpdateStudent) -> Self{
        StudentChanges{
            name: update.name,
            email: update.email,
            course: update.course,
            status: update.status,
            progress: update.progress,
            certificate_url: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse{
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    pub price: Option<i32>,
    #[serde(default)]
    pub max_students: i32,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub modules: Vec<CourseModule>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourse{
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub price: Option<i32>,
    pub max_students: Option<i32>,
    pub current_students: Option<i32>,
    pub status: Option<CourseStatus>,
    pub instructor: Option<String>,
    pub modules: Option<Vec<CourseModule>>,
}

impl From<UpdateCourse> for CourseChanges{
    fn from(update: UpdateCourse) -> Self{
        CourseChanges{
            title: update.title,
            description: update.description,
            duration: update.duration,
            price: update.price,
            max_students: update.max_students,
            current_students: update.current_students,
            status: update.status,
            instructor: update.instructor,
            modules: update.modules,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PatchCourse{
    pub status: CourseStatus,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateService{
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: Option<i32>,
    pub duration: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateService{
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<i32>,
    pub duration: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateService> for ServiceChanges{
    fn from(update: UpdateService) -> Self{
        ServiceChanges{
            title: update.title,
            description: update.description,
            category: update.category,
            price: update.price,
            duration: update.duration,
            image: update.image,
            is_active: update.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchService{
    pub is_active: bool,
}

#[derive(Serialize, Deserialize)]
pub struct StudentList{
    pub students: Vec<Student>,
}

#[derive(Serialize, Deserialize)]
pub struct StudentResponse{
    pub success: bool,
    pub student: Student,
}

#[derive(Serialize, Deserialize)]
pub struct CourseList{
    pub courses: Vec<Course>,
}

#[derive(Serialize, Deserialize)]
pub struct CourseResponse{
    pub success: bool,
    pub course: Course,
}

#[derive(Serialize, Deserialize)]
pub struct ServiceList{
    pub services: Vec<Service>,
}

#[derive(Serialize, Deserialize)]
pub struct ServiceResponse{
    pub success: bool,
    pub service: Service,
}

#[derive(Serialize, Deserialize)]
pub struct CertificateList{
    pub certificates: Vec<Certificate>,
}

#[derive(Serialize, Deserialize)]
pub struct CertificateResponse{
    pub success: bool,
    pub message: String,
    pub certificate: Certificate,
}

#[derive(Serialize, Deserialize)]
pub struct SubscriberList{
    pub subscribers: Vec<NewsletterSubscriber>,
    pub pagination: Pagination,
}

#[derive(Serialize, Deserialize)]
pub struct DeleteResponse{
    pub success: bool,
    pub id: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats{
    pub total_students: usize,
    pub active_courses: usize,
    pub total_services: usize,
    pub newsletter_subscribers: i64,
    pub eligible_for_certificate: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind{
    Student,
    Newsletter,
    Certificate,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Activity{
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub time_ago: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse{
    pub stats: DashboardStats,
    pub recent_activity: Vec<Activity>,
}
