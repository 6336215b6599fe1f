//! Outgoing email. Handlers hand a [`Mail`] to the [`Mailer`] behind `GlobalState`;
//! delivery problems are logged and never fail the request that triggered them.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::config::{Config, SmtpConfig};

pub type SharedMailer = Arc<dyn Mailer>;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mail {
    /// Sent when an address joins the newsletter.
    Welcome { to: String, name: Option<String> },
    /// Login details for a student the admin just enrolled.
    StudentInvitation { to: String, name: String, password: String },
    CourseCompletion { to: String, name: String, course: String },
}

impl Mail {
    pub fn to(&self) -> &str {
        match self {
            Mail::Welcome { to, .. } | Mail::StudentInvitation { to, .. } | Mail::CourseCompletion { to, .. } => to,
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            Mail::Welcome { .. } => "Welcome to The Fringe Newsletter!",
            Mail::StudentInvitation { .. } => "Welcome to The Fringe Academy!",
            Mail::CourseCompletion { .. } => "Congratulations on Course Completion!",
        }
    }

    pub fn html(&self, site_url: &str) -> String {
        let body = match self {
            Mail::Welcome { name, .. } => format!(
                "<h1>Welcome to The Fringe!</h1>\
                 <p>Hi {},</p>\
                 <p>Thank you for subscribing to our newsletter! You'll now receive the latest beauty tips, course updates and exclusive offers.</p>",
                escape(name.as_deref().unwrap_or("there"))
            ),
            Mail::StudentInvitation { to, name, password } => format!(
                "<h1>Welcome to The Fringe Academy!</h1>\
                 <p>Hi {},</p>\
                 <p>You have been enrolled in The Fringe Academy! Here are your login credentials:</p>\
                 <p><strong>Email:</strong> {}<br><strong>Temporary Password:</strong> {}</p>\
                 <p>Please log in to your student portal and change your password.</p>\
                 <p><a href=\"{}/student/login\">Access Student Portal</a></p>",
                escape(name),
                escape(to),
                escape(password),
                site_url
            ),
            Mail::CourseCompletion { name, course, .. } => format!(
                "<h1>Congratulations!</h1>\
                 <p>Hi {},</p>\
                 <p>Congratulations on successfully completing the <strong>{}</strong> course!</p>\
                 <p>Your certificate will be available in your student portal.</p>\
                 <p><a href=\"{}/student/dashboard\">Open the Student Portal</a></p>",
                escape(name),
                escape(course),
                site_url
            ),
        };

        format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">{}<p>Best regards,<br>The Fringe Team</p></div>",
            body
        )
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &Mail) -> Result<(), MailError>;
}

/// Sends `mail` and logs the outcome.
pub async fn deliver(mailer: &dyn Mailer, mail: Mail) {
    match mailer.send(&mail).await {
        Ok(()) => tracing::debug!(to = %mail.to(), subject = mail.subject(), "email sent"),
        Err(e) => tracing::warn!(to = %mail.to(), subject = mail.subject(), error = %e, "could not send email"),
    }
}

/// SMTP with STARTTLS and login credentials.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    site_url: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, site_url: &str) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .build();

        Ok(SmtpMailer {
            transport,
            from: config.from.parse()?,
            site_url: site_url.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(mail.to().parse()?)
            .subject(mail.subject())
            .header(ContentType::TEXT_HTML)
            .body(mail.html(&self.site_url))?;

        self.transport.send(message).await?;
        Ok(())
    }
}

/// Stand-in when no mail server is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        tracing::info!(to = %mail.to(), subject = mail.subject(), "email delivery disabled, message dropped");
        Ok(())
    }
}

pub fn from_config(config: &Config) -> Result<SharedMailer, MailError> {
    match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "email delivery over smtp");
            Ok(Arc::new(SmtpMailer::new(smtp, &config.site_url)?))
        }
        None => {
            tracing::warn!("EMAIL_HOST not set, emails are logged instead of sent");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Keeps every message for tests to inspect.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingMailer {
    sent: std::sync::Mutex<Vec<Mail>>,
}

#[cfg(test)]
impl RecordingMailer {
    pub fn sent(&self) -> Vec<Mail> {
        self.sent.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_text_is_escaped() {
        let mail = Mail::Welcome { to: "a@example.com".to_string(), name: Some("<b>Nina</b>".to_string()) };
        let html = mail.html("http://localhost");

        assert!(html.contains("&lt;b&gt;Nina&lt;/b&gt;"));
        assert!(!html.contains("<b>Nina"));
    }

    #[test]
    fn invitation_carries_credentials_and_portal_link() {
        let mail = Mail::StudentInvitation {
            to: "nina@example.com".to_string(),
            name: "Nina".to_string(),
            password: "Tmp12345".to_string(),
        };
        let html = mail.html("https://thefringe.com");

        assert_eq!(mail.to(), "nina@example.com");
        assert!(html.contains("Tmp12345"));
        assert!(html.contains("https://thefringe.com/student/login"));
    }

    #[actix_web::test]
    async fn log_mailer_never_fails() {
        let mail = Mail::CourseCompletion {
            to: "john@example.com".to_string(),
            name: "John".to_string(),
            course: "Professional Hair Styling".to_string(),
        };

        assert!(LogMailer.send(&mail).await.is_ok());
    }
}
