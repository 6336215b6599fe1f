use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

use super::contains_ignore_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Draft,
    Active,
    Archived,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "draft",
            CourseStatus::Active => "active",
            CourseStatus::Archived => "archived",
        }
    }
}

impl FromStr for CourseStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(CourseStatus::Draft),
            "active" => Ok(CourseStatus::Active),
            "archived" => Ok(CourseStatus::Archived),
            other => Err(AppError::bad_request(format!("Unknown course status: {}", other))),
        }
    }
}

/// One lesson of a course; `duration` is in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: i32,
    pub video_url: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub price: Option<i32>,
    pub max_students: i32,
    pub current_students: i32,
    pub status: CourseStatus,
    pub instructor: String,
    pub modules: Vec<CourseModule>,
}

impl Course {
    pub fn hide_price(mut self) -> Self {
        self.price = None;
        self
    }
}

pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub price: Option<i32>,
    pub max_students: i32,
    pub instructor: String,
    pub modules: Vec<CourseModule>,
}

#[derive(Debug, Default, Clone)]
pub struct CourseChanges {
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

impl CourseChanges {
    pub fn status(status: CourseStatus) -> Self {
        CourseChanges { status: Some(status), ..Default::default() }
    }

    pub fn apply(self, course: &mut Course) {
        if let Some(title) = self.title {
            course.title = title;
        }
        if let Some(description) = self.description {
            course.description = description;
        }
        if let Some(duration) = self.duration {
            course.duration = duration;
        }
        if let Some(price) = self.price {
            course.price = Some(price);
        }
        if let Some(max) = self.max_students {
            course.max_students = max;
        }
        if let Some(current) = self.current_students {
            course.current_students = current;
        }
        if let Some(status) = self.status {
            course.status = status;
        }
        if let Some(instructor) = self.instructor {
            course.instructor = instructor;
        }
        if let Some(modules) = self.modules {
            course.modules = modules;
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CourseFilter {
    pub status: Option<CourseStatus>,
    pub search: Option<String>,
}

impl CourseFilter {
    pub fn active() -> Self {
        CourseFilter { status: Some(CourseStatus::Active), search: None }
    }

    pub fn matches(&self, course: &Course) -> bool {
        if let Some(status) = self.status {
            if course.status != status {
                return false;
            }
        }

        match &self.search {
            Some(term) => {
                contains_ignore_case(&course.title, term)
                    || contains_ignore_case(&course.description, term)
                    || contains_ignore_case(&course.instructor, term)
            }
            None => true,
        }
    }
}
