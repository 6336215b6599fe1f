use actix_web::{get, web, HttpResponse};
use chrono::{DateTime, NaiveTime, Utc};

use crate::{
    errors::AppError,
    models::{
        certificate::{CertificateFilter, CertificateStatus},
        course::{CourseFilter, CourseStatus},
        newsletter::Page,
        service::ServiceFilter,
        student::StudentFilter,
    },
    schema::admin::{Activity, ActivityKind, DashboardResponse, DashboardStats},
    GlobalState,
};

const RECENT_ACTIVITY_LEN: usize = 5;

#[get("/dashboard")]
pub async fn admin_dashboard(data:web::Data<GlobalState>) -> Result<HttpResponse, AppError>{
    let store = &data.store;

    let students = store.list_students(&StudentFilter::default()).await?;
    let courses = store.list_courses(&CourseFilter::default()).await?;
    let services = store.list_services(&ServiceFilter::default()).await?;
    let (_, subscribers) = store.list_subscribers(Page::new(None, Some(1))).await?;
    let (latest_subscribers, _) = store.list_subscribers(Page::new(None, Some(RECENT_ACTIVITY_LEN as i64))).await?;
    let certificates = store.list_certificates(&CertificateFilter{
        status: Some(CertificateStatus::Issued),
        ..Default::default()
    }).await?;

    let stats = DashboardStats{
        total_students: students.len(),
        active_courses: courses.iter().filter(|c| c.status == CourseStatus::Active).count(),
        total_services: services.len(),
        newsletter_subscribers: subscribers,
        eligible_for_certificate: students.iter().filter(|s| s.is_certificate_eligible()).count(),
    };

    let mut events: Vec<(ActivityKind, String, DateTime<Utc>)> = Vec::new();

    events.extend(students.iter().map(|s|(
        ActivityKind::Student,
        format!("New student {} enrolled in {}", s.name, s.course),
        s.enrollment_date.and_time(NaiveTime::MIN).and_utc(),
    )));
    events.extend(latest_subscribers.iter().map(|s|(
        ActivityKind::Newsletter,
        format!("{} subscribed to the newsletter", s.email),
        s.subscribed_at,
    )));
    events.extend(certificates.iter().map(|c|(
        ActivityKind::Certificate,
        format!("Certificate issued to {} for {}", c.student_name, c.course_name),
        c.completion_date,
    )));

    Ok(HttpResponse::Ok().json(DashboardResponse{
        stats,
        recent_activity: recent_activity(events, Utc::now()),
    }))
}

/// Newest first, at most [`RECENT_ACTIVITY_LEN`] entries.
fn recent_activity(mut events:Vec<(ActivityKind, String, DateTime<Utc>)>, now:DateTime<Utc>) -> Vec<Activity>{
    events.sort_by(|a, b| b.2.cmp(&a.2));

    events.into_iter()
        .take(RECENT_ACTIVITY_LEN)
        .map(|(kind, description, timestamp)| Activity{
            kind,
            description,
            timestamp,
            time_ago: time_ago(timestamp, now),
        })
        .collect()
}

pub fn time_ago(then:DateTime<Utc>, now:DateTime<Utc>) -> String{
    let elapsed = now.signed_duration_since(then);

    let (count, unit) = if elapsed.num_days() > 0{
        (elapsed.num_days(), "day")
    } else if elapsed.num_hours() > 0{
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_minutes() > 0{
        (elapsed.num_minutes(), "minute")
    } else{
        return "just now".to_string();
    };

    format!("{} {}{} ago", count, unit, if count == 1 { "" } else { "s" })
}

#[cfg(test)]
mod tests{
    use actix_web::test::{self, TestRequest};
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    use crate::test_init_app::{self, bearer};

    use super::*;

    #[actix_web::test]
    async fn test_dashboard_counts_seeded_records(){
        let (app, _ctx) = test_init_app::init().await;
        let token = test_init_app::admin_token(&app).await;

        let req = TestRequest::get().uri("/api/admin/dashboard").insert_header(bearer(&token)).to_request();
        let res: DashboardResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(res.stats, DashboardStats{
            total_students: 7,
            active_courses: 3,
            total_services: 4,
            newsletter_subscribers: 5,
            eligible_for_certificate: 1,
        });
        assert_eq!(res.recent_activity.len(), RECENT_ACTIVITY_LEN);
        assert!(res.recent_activity.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[actix_web::test]
    async fn test_new_subscriber_leads_recent_activity(){
        let (app, _ctx) = test_init_app::init().await;
        let token = test_init_app::admin_token(&app).await;

        let req = TestRequest::post().uri("/api/newsletter").set_json(json!({"email": "lena@example.com"})).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = TestRequest::get().uri("/api/admin/dashboard").insert_header(bearer(&token)).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let first = &body["recentActivity"][0];
        assert_eq!(first["type"], "newsletter");
        assert!(first["description"].as_str().unwrap().contains("lena@example.com"));
        assert_eq!(first["timeAgo"], "just now");
        assert_eq!(body["stats"]["newsletterSubscribers"], 6);
    }

    #[test]
    fn time_ago_picks_the_largest_unit(){
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();

        assert_eq!(time_ago(now - Duration::seconds(20), now), "just now");
        assert_eq!(time_ago(now + Duration::hours(1), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(time_ago(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(time_ago(now - Duration::days(2) - Duration::hours(3), now), "2 days ago");
    }
}
