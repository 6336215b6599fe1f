use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
}

/// The single site-wide settings record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub show_prices: bool,
    pub site_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
    pub social_media: SocialLinks,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsChanges {
    pub show_prices: Option<bool>,
    pub site_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub social_media: Option<SocialLinks>,
}

impl SettingsChanges {
    pub fn apply(self, settings: &mut SiteSettings, now: DateTime<Utc>) {
        if let Some(show) = self.show_prices {
            settings.show_prices = show;
        }
        if let Some(name) = self.site_name {
            settings.site_name = name;
        }
        if let Some(email) = self.contact_email {
            settings.contact_email = email;
        }
        if let Some(phone) = self.contact_phone {
            settings.contact_phone = phone;
        }
        if let Some(address) = self.address {
            settings.address = address;
        }
        if let Some(social) = self.social_media {
            settings.social_media = social;
        }
        settings.updated_at = now;
    }
}
