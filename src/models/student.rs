use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

use super::contains_ignore_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Active,
    Completed,
    Paused,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Completed => "completed",
            StudentStatus::Paused => "paused",
        }
    }
}

impl FromStr for StudentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(StudentStatus::Active),
            "completed" => Ok(StudentStatus::Completed),
            "paused" => Ok(StudentStatus::Paused),
            other => Err(AppError::bad_request(format!("Unknown student status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub course: String,
    pub enrollment_date: NaiveDate,
    pub progress: i32,
    pub status: StudentStatus,
    pub certificate_url: Option<String>,
}

impl Student {
    pub fn is_certificate_eligible(&self) -> bool {
        self.progress >= 100
    }
}

pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub course: String,
    pub enrollment_date: NaiveDate,
}

#[derive(Debug, Default, Clone)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    pub status: Option<StudentStatus>,
    pub progress: Option<i32>,
    pub certificate_url: Option<String>,
}

impl StudentChanges {
    pub fn apply(self, student: &mut Student) {
        if let Some(name) = self.name {
            student.name = name;
        }
        if let Some(email) = self.email {
            student.email = email;
        }
        if let Some(course) = self.course {
            student.course = course;
        }
        if let Some(status) = self.status {
            student.status = status;
        }
        if let Some(progress) = self.progress {
            student.progress = progress;
        }
        if let Some(url) = self.certificate_url {
            student.certificate_url = Some(url);
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct StudentFilter {
    pub status: Option<StudentStatus>,
    pub search: Option<String>,
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        if let Some(status) = self.status {
            if student.status != status {
                return false;
            }
        }

        match &self.search {
            Some(term) => {
                contains_ignore_case(&student.name, term)
                    || contains_ignore_case(&student.email, term)
                    || contains_ignore_case(&student.course, term)
            }
            None => true,
        }
    }
}
