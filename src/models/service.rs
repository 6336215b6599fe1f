use serde::{Deserialize, Serialize};

use super::contains_ignore_case;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: Option<i32>,
    pub duration: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
}

impl Service {
    pub fn hide_price(mut self) -> Self {
        self.price = None;
        self
    }
}

pub struct NewService {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: Option<i32>,
    pub duration: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ServiceChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<i32>,
    pub duration: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

impl ServiceChanges {
    pub fn apply(self, service: &mut Service) {
        if let Some(title) = self.title {
            service.title = title;
        }
        if let Some(description) = self.description {
            service.description = description;
        }
        if let Some(category) = self.category {
            service.category = category;
        }
        if let Some(price) = self.price {
            service.price = Some(price);
        }
        if let Some(duration) = self.duration {
            service.duration = Some(duration);
        }
        if let Some(image) = self.image {
            service.image = Some(image);
        }
        if let Some(active) = self.is_active {
            service.is_active = active;
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ServiceFilter {
    /// Exact, case-sensitive category match.
    pub category: Option<String>,
    pub search: Option<String>,
    pub active: Option<bool>,
}

impl ServiceFilter {
    pub fn matches(&self, service: &Service) -> bool {
        if let Some(active) = self.active {
            if service.is_active != active {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if &service.category != category {
                return false;
            }
        }

        match &self.search {
            Some(term) => {
                contains_ignore_case(&service.title, term)
                    || contains_ignore_case(&service.description, term)
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(category: &str) -> Service {
        Service {
            id: "1".to_string(),
            title: "Gel Manicure".to_string(),
            description: "Long-lasting gel manicure".to_string(),
            category: category.to_string(),
            price: Some(35),
            duration: None,
            image: None,
            is_active: true,
        }
    }

    #[test]
    fn category_must_match_exactly() {
        let filter = ServiceFilter { category: Some("Nails".to_string()), ..Default::default() };

        assert!(filter.matches(&service("Nails")));
        assert!(!filter.matches(&service("nails")));
        assert!(!filter.matches(&service("Nails & Hands")));
    }
}
