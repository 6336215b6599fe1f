use actix_web::{get, http::header, post, web::{self, Json}, HttpResponse};

use crate::{
    errors::AppError,
    mailer::{self, Mail},
    models::newsletter::{is_valid_email, NewsletterSubscriber, Page, Pagination, SubscribeOutcome},
    schema::{admin::SubscriberList, public::{SubscribeRequest, UnsubscribeRequest}, MessageResponse, PageQuery},
    GlobalState,
};

/// Single upsert keyed by email: new addresses are created, unsubscribed ones come
/// back to life and active ones are refused.
#[post("")]
pub async fn subscribe(data:web::Data<GlobalState>, body:Json<SubscribeRequest>) -> Result<HttpResponse, AppError>{
    let body = body.into_inner();

    let email = body.email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::bad_request("Email is required"))?
        .to_lowercase();

    if !is_valid_email(&email){
        return Err(AppError::bad_request("Invalid email address"));
    }

    let name = body.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

    match data.store.subscribe(&email, name).await?{
        SubscribeOutcome::AlreadyActive => Err(AppError::bad_request("Already subscribed")),
        SubscribeOutcome::Reactivated(sub) => {
            tracing::info!(email = %sub.email, "newsletter subscription reactivated");
            Ok(HttpResponse::Ok().json(MessageResponse::ok("Welcome back! Your subscription is active again.")))
        }
        SubscribeOutcome::Created(sub) => {
            tracing::info!(email = %sub.email, "newsletter subscription created");
            mailer::deliver(data.mailer.as_ref(), Mail::Welcome{ to: sub.email, name: sub.name }).await;
            Ok(HttpResponse::Ok().json(MessageResponse::ok("Successfully subscribed to the newsletter")))
        }
    }
}

#[post("/unsubscribe")]
pub async fn unsubscribe(data:web::Data<GlobalState>, body:Json<UnsubscribeRequest>) -> Result<HttpResponse, AppError>{
    let email = body.email.trim().to_lowercase();

    if !data.store.unsubscribe(&email).await?{
        return Err(AppError::not_found("Subscription"));
    }

    tracing::info!(%email, "newsletter subscription cancelled");

    Ok(HttpResponse::Ok().json(MessageResponse::ok("Successfully unsubscribed")))
}

#[get("")]
pub async fn list_subscribers(data:web::Data<GlobalState>, query:web::Query<PageQuery>) -> Result<HttpResponse, AppError>{
    let page = Page::new(query.page, query.limit);

    let (subscribers, total) = data.store.list_subscribers(page).await?;

    Ok(HttpResponse::Ok().json(SubscriberList{
        subscribers,
        pagination: Pagination::new(page, total),
    }))
}

#[get("/export")]
pub async fn export_subscribers(data:web::Data<GlobalState>) -> Result<HttpResponse, AppError>{
    let subscribers = data.store.active_subscribers().await?;
    let csv = to_csv(&subscribers)?;

    tracing::info!(rows = subscribers.len(), "newsletter export");

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((header::CONTENT_DISPOSITION, "attachment; filename=\"newsletter_subscribers.csv\""))
        .body(csv))
}

fn to_csv(subscribers:&[NewsletterSubscriber]) -> Result<Vec<u8>, AppError>{
    let csv_error = |e: csv::Error|{
        tracing::error!(error = %e, "could not write csv");
        AppError::InternalError
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["email", "name", "subscribedAt"]).map_err(csv_error)?;

    for sub in subscribers{
        let subscribed_at = sub.subscribed_at.to_rfc3339();
        writer.write_record([
            sub.email.as_str(),
            sub.name.as_deref().unwrap_or_default(),
            subscribed_at.as_str(),
        ]).map_err(csv_error)?;
    }

    writer.into_inner().map_err(|e|{
        tracing::error!(error = %e, "could not flush csv");
        AppError::InternalError
    })
}

#[cfg(test)]
mod tests{
    use actix_web::test::{self, TestRequest};
    use serde_json::json;

    use crate::{errors::CustomError, test_init_app::{self, bearer}};

    use super::*;

    #[actix_web::test]
    async fn test_subscribe_lifecycle(){
        let (app, ctx) = test_init_app::init().await;

        let req = TestRequest::post().uri("/api/newsletter").set_json(json!({"email": "Nina@Example.com", "name": "Nina"})).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = TestRequest::post().uri("/api/newsletter").set_json(json!({"email": "nina@example.com"})).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 400);
        let err: CustomError = test::read_body_json(res).await;
        assert_eq!(err.error, "Already subscribed");

        let req = TestRequest::post().uri("/api/newsletter/unsubscribe").set_json(json!({"email": "nina@example.com"})).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = TestRequest::post().uri("/api/newsletter").set_json(json!({"email": "nina@example.com"})).to_request();
        let res: MessageResponse = test::call_and_read_body_json(&app, req).await;
        assert!(res.message.contains("active again"));

        // one welcome for the first subscription only
        assert_eq!(ctx.mailer.sent(), vec![Mail::Welcome{
            to: "nina@example.com".to_string(),
            name: Some("Nina".to_string()),
        }]);
    }

    #[actix_web::test]
    async fn test_subscribe_validates_email(){
        let (app, _ctx) = test_init_app::init().await;

        for body in [json!({}), json!({"email": "  "}), json!({"email": "not-an-email"})]{
            let req = TestRequest::post().uri("/api/newsletter").set_json(&body).to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 400, "{}", body);
        }
    }

    #[actix_web::test]
    async fn test_admin_pagination(){
        let (app, _ctx) = test_init_app::init().await;
        let token = test_init_app::admin_token(&app).await;

        let req = TestRequest::get().uri("/api/admin/newsletter?page=1&limit=2").insert_header(bearer(&token)).to_request();
        let res: SubscriberList = test::call_and_read_body_json(&app, req).await;

        assert_eq!(res.subscribers.len(), 2);
        assert_eq!(res.subscribers[0].email, "sarah@example.com");
        assert_eq!(res.pagination.total, 5);
        assert_eq!(res.pagination.pages, 3);

        let req = TestRequest::get().uri("/api/admin/newsletter?limit=500&page=0").insert_header(bearer(&token)).to_request();
        let res: SubscriberList = test::call_and_read_body_json(&app, req).await;
        assert_eq!(res.pagination.page, 1);
        assert_eq!(res.pagination.limit, 100);

        let req = TestRequest::get()
            .uri(&format!("/api/admin/newsletter?page={}", i64::MAX))
            .insert_header(bearer(&token))
            .to_request();
        let res: SubscriberList = test::call_and_read_body_json(&app, req).await;
        assert!(res.subscribers.is_empty());
        assert_eq!(res.pagination.total, 5);
    }

    #[actix_web::test]
    async fn test_export_is_csv(){
        let (app, _ctx) = test_init_app::init().await;
        let token = test_init_app::admin_token(&app).await;

        let req = TestRequest::get().uri("/api/admin/newsletter/export").insert_header(bearer(&token)).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
        assert!(res.headers().get("content-type").unwrap().to_str().unwrap().starts_with("text/csv"));

        let body = test::read_body(res).await;
        let text = std::str::from_utf8(&body).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("email,name,subscribedAt"));
        assert_eq!(lines.count(), 5);
    }
}
