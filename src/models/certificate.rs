use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

use super::contains_ignore_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    Issued,
    Pending,
    Revoked,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::Issued => "issued",
            CertificateStatus::Pending => "pending",
            CertificateStatus::Revoked => "revoked",
        }
    }
}

impl FromStr for CertificateStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "issued" => Ok(CertificateStatus::Issued),
            "pending" => Ok(CertificateStatus::Pending),
            "revoked" => Ok(CertificateStatus::Revoked),
            other => Err(AppError::bad_request(format!("Unknown certificate status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub course_name: String,
    pub completion_date: DateTime<Utc>,
    pub status: CertificateStatus,
    pub certificate_url: String,
    pub generated_by: String,
}

pub struct NewCertificate {
    pub student_id: String,
    pub student_name: String,
    pub course_name: String,
    pub completion_date: DateTime<Utc>,
    pub certificate_url: String,
    pub generated_by: String,
}

#[derive(Debug, Default, Clone)]
pub struct CertificateFilter {
    pub status: Option<CertificateStatus>,
    pub search: Option<String>,
    pub student_id: Option<String>,
}

impl CertificateFilter {
    pub fn for_student(student_id: &str) -> Self {
        CertificateFilter { student_id: Some(student_id.to_string()), ..Default::default() }
    }

    pub fn matches(&self, cert: &Certificate) -> bool {
        if let Some(status) = self.status {
            if cert.status != status {
                return false;
            }
        }

        if let Some(student_id) = &self.student_id {
            if &cert.student_id != student_id {
                return false;
            }
        }

        match &self.search {
            Some(term) => {
                contains_ignore_case(&cert.student_name, term)
                    || contains_ignore_case(&cert.course_name, term)
            }
            None => true,
        }
    }
}
