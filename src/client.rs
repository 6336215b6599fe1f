//! HTTP client for the public API, for callers such as the site's page renderer.
//!
//! Reads never fail: when no base URL is configured or the API cannot be reached the
//! client answers from [`mock_data`]. Writes fall back to a logged no-op for
//! transport failures but surface the API's own `{error}` answers.

use std::time::Duration;

use reqwest::Url;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{
    config::Config,
    errors::CustomError,
    mock_data,
    models::{course::{Course, CourseStatus}, service::Service, settings::SiteSettings},
    schema::{
        admin::{CourseList, CourseResponse, ServiceList},
        public::{SubscribeRequest, UnsubscribeRequest},
        MessageResponse,
    },
};

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClientError{
    #[error("no API configured")]
    NotConfigured,
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(#[from] CustomError),
}

impl ClientError{
    /// True when the API was never reached, as opposed to the API refusing the call.
    pub fn is_unavailable(&self) -> bool{
        !matches!(self, ClientError::Api(_))
    }
}

#[derive(Clone)]
pub struct ApiClient{
    base_url: Option<Url>,
    http: reqwest::Client,
}

impl ApiClient{
    pub fn new(base_url:Option<&str>) -> Result<Self, ClientError>{
        let base_url = base_url
            .map(|raw| Url::parse(raw).map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", raw, e))))
            .transpose()?;

        if base_url.as_ref().is_some_and(Url::cannot_be_a_base){
            return Err(ClientError::InvalidBaseUrl("URL cannot carry a path".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()?;

        Ok(ApiClient{ base_url, http })
    }

    pub fn from_config(config:&Config) -> Result<Self, ClientError>{
        ApiClient::new(config.api_base_url.as_deref())
    }

    /// `<base>/api/<segments>`, each segment percent-encoded on its own.
    fn url(&self, segments:&[&str]) -> Result<Url, ClientError>{
        let mut url = self.base_url.clone().ok_or(ClientError::NotConfigured)?;

        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl("URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);

        Ok(url)
    }

    async fn get<T:DeserializeOwned>(&self, segments:&[&str], query:&[(&str, &str)]) -> Result<T, ClientError>{
        let res = self.http.get(self.url(segments)?).query(query).send().await?;
        read(res).await
    }

    async fn post<B:Serialize, T:DeserializeOwned>(&self, segments:&[&str], body:&B) -> Result<T, ClientError>{
        let res = self.http.post(self.url(segments)?).json(body).send().await?;
        read(res).await
    }

    pub async fn services(&self, category:Option<&str>) -> Vec<Service>{
        let query: Vec<(&str, &str)> = category.map(|c| ("category", c)).into_iter().collect();

        match self.get::<ServiceList>(&["services"], &query).await{
            Ok(list) => list.services,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to mock services");
                mock_data::services()
                    .into_iter()
                    .filter(|s| s.is_active && category.map_or(true, |c| c.eq_ignore_ascii_case("all") || s.category == c))
                    .collect()
            }
        }
    }

    pub async fn courses(&self) -> Vec<Course>{
        match self.get::<CourseList>(&["courses"], &[]).await{
            Ok(list) => list.courses,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to mock courses");
                mock_courses().collect()
            }
        }
    }

    pub async fn course(&self, id:&str) -> Option<Course>{
        match self.get::<CourseResponse>(&["courses", id], &[]).await{
            Ok(res) => Some(res.course),
            Err(ClientError::Api(e)) => {
                tracing::debug!(%id, error = %e.error, "course lookup refused");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "falling back to mock course");
                mock_courses().find(|c| c.id == id)
            }
        }
    }

    pub async fn settings(&self) -> SiteSettings{
        match self.get::<SiteSettings>(&["settings"], &[]).await{
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to mock settings");
                mock_data::settings()
            }
        }
    }

    pub async fn subscribe(&self, email:&str, name:Option<&str>) -> Result<MessageResponse, ClientError>{
        let body = SubscribeRequest{ email: Some(email.to_string()), name: name.map(str::to_string) };

        match self.post::<_, MessageResponse>(&["newsletter"], &body).await{
            Err(e) if e.is_unavailable() => {
                tracing::warn!(error = %e, "API unavailable, subscription not sent");
                Ok(MessageResponse::ok("Successfully subscribed to the newsletter"))
            }
            other => other,
        }
    }

    pub async fn unsubscribe(&self, email:&str) -> Result<MessageResponse, ClientError>{
        let body = UnsubscribeRequest{ email: email.to_string() };

        match self.post::<_, MessageResponse>(&["newsletter", "unsubscribe"], &body).await{
            Err(e) if e.is_unavailable() => {
                tracing::warn!(error = %e, "API unavailable, unsubscription not sent");
                Ok(MessageResponse::ok("Successfully unsubscribed"))
            }
            other => other,
        }
    }
}

fn mock_courses() -> impl Iterator<Item = Course>{
    mock_data::courses().into_iter().filter(|c| c.status == CourseStatus::Active)
}

async fn read<T:DeserializeOwned>(res:reqwest::Response) -> Result<T, ClientError>{
    let status = res.status();
    if status.is_success(){
        return Ok(res.json().await?);
    }

    let err = res
        .json::<CustomError>()
        .await
        .unwrap_or_else(|_| CustomError::new(format!("HTTP {}", status.as_u16())));
    Err(ClientError::Api(err))
}

#[cfg(test)]
mod tests{
    use std::sync::Arc;

    use actix_web::{web, App, HttpServer};

    use crate::{store::MemoryStore, GlobalState};

    use super::*;

    #[actix_web::test]
    async fn test_unconfigured_client_serves_mock_data(){
        let client = ApiClient::new(None).unwrap();

        assert_eq!(client.services(None).await.len(), 4);
        assert_eq!(client.services(Some("Bridal")).await.len(), 1);
        assert_eq!(client.courses().await.len(), 3);
        assert!(client.course("3").await.is_none());
        assert_eq!(client.settings().await.site_name, "The Fringe Beauty Academy");
        assert!(client.subscribe("x@example.com", None).await.unwrap().success);
    }

    #[actix_web::test]
    async fn test_unreachable_api_falls_back(){
        let client = ApiClient::new(Some("http://127.0.0.1:1/")).unwrap();

        assert_eq!(client.courses().await.len(), 3);
        assert_eq!(client.course("1").await.unwrap().title, "Professional Hair Styling");
    }

    #[actix_web::test]
    async fn test_live_api_answers_and_errors_surface(){
        let public_dir = tempfile::tempdir().unwrap();
        let state = web::Data::new(GlobalState{
            store: Arc::new(MemoryStore::seeded()),
            mailer: Arc::new(crate::mailer::LogMailer),
            config: Config::for_tests(public_dir.path()),
        });

        let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(crate::configure))
            .workers(1)
            .bind(("127.0.0.1", 0))
            .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let client = ApiClient::new(Some(&format!("http://{}", addr))).unwrap();

        let services = client.services(Some("Skin Care")).await;
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].title, "Facial Treatment");

        assert!(client.subscribe("new@example.com", Some("New")).await.is_ok());
        match client.subscribe("new@example.com", None).await{
            Err(ClientError::Api(e)) => assert_eq!(e.error, "Already subscribed"),
            other => panic!("expected an API error, got {:?}", other.map(|m| m.message)),
        }

        assert!(client.course("3").await.is_none());

        handle.stop(false).await;
    }

    #[test]
    fn path_segments_are_encoded_separately(){
        let client = ApiClient::new(Some("http://localhost:8080/")).unwrap();
        assert_eq!(client.url(&["courses", "a b/c"]).unwrap().as_str(), "http://localhost:8080/api/courses/a%20b%2Fc");

        let nested = ApiClient::new(Some("https://thefringe.com/site")).unwrap();
        assert_eq!(nested.url(&["settings"]).unwrap().as_str(), "https://thefringe.com/site/api/settings");
    }

    #[test]
    fn bad_base_urls_are_refused(){
        assert!(matches!(ApiClient::new(Some("not a url")), Err(ClientError::InvalidBaseUrl(_))));
        assert!(matches!(ApiClient::new(Some("mailto:info@thefringe.com")), Err(ClientError::InvalidBaseUrl(_))));
        assert!(matches!(ApiClient::new(None).unwrap().url(&["settings"]), Err(ClientError::NotConfigured)));
    }
}
