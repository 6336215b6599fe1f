use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub enum SubscribeOutcome {
    Created(NewsletterSubscriber),
    Reactivated(NewsletterSubscriber),
    AlreadyActive,
}

/// Skip/take window over the active subscribers, `page` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Page {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Saturates for absurd page numbers; such a window is simply empty.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: Page, total: i64) -> Self {
        Pagination {
            page: page.page,
            limit: page.limit,
            total,
            pages: (total + page.limit - 1) / page.limit,
        }
    }
}

/// Loose shape check: one `@`, non-empty local part, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_bounds() {
        assert_eq!(Page::new(None, None), Page { page: 1, limit: 10 });
        assert_eq!(Page::new(Some(0), Some(1000)), Page { page: 1, limit: 100 });
        assert_eq!(Page::new(Some(3), Some(5)).offset(), 10);
    }

    #[test]
    fn huge_page_offset_saturates() {
        assert_eq!(Page::new(Some(i64::MAX), Some(100)).offset(), i64::MAX);
    }

    #[test]
    fn pages_round_up() {
        assert_eq!(Pagination::new(Page::new(Some(1), Some(10)), 21).pages, 3);
        assert_eq!(Pagination::new(Page::new(Some(1), Some(10)), 0).pages, 0);
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("sarah@example.com"));
        assert!(!is_valid_email("sarah@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("sa rah@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
    }
}
