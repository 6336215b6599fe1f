use actix_web::{get, post, web::{self, Json}, HttpRequest, HttpResponse};
use chrono::Utc;

use crate::{
    errors::AppError,
    mailer::{self, Mail},
    models::{
        certificate::CertificateFilter,
        progress::{overall_progress, ModuleProgress, ProgressReport},
        student::{Student, StudentChanges, StudentStatus},
    },
    schema::{
        admin::CertificateList,
        student::{AckedProgress, ProgressAck, ProgressSummary, StudentDashboard},
    },
    GlobalState,
};

use super::session;

async fn current_student(state:&GlobalState, req:&HttpRequest) -> Result<Student, AppError>{
    let user = session(req)?;

    state.store
        .find_student_by_email(&user.email)
        .await?
        .ok_or_else(|| AppError::not_found("Student record"))
}

#[get("/dashboard")]
pub async fn dashboard(data:web::Data<GlobalState>, req:HttpRequest) -> Result<HttpResponse, AppError>{
    let student = current_student(&data, &req).await?;

    let course = data.store.find_course_by_title(&student.course).await?;
    let records = data.store.module_progress(&student.email).await?;
    let progress = ProgressSummary::build(&student, course.as_ref(), &records);

    Ok(HttpResponse::Ok().json(StudentDashboard{ student, course, progress }))
}

/// Records a video player report. The overall course percentage never drops below what
/// was already stored.
#[post("/progress")]
pub async fn report_progress(data:web::Data<GlobalState>, req:HttpRequest, report:Json<ProgressReport>) -> Result<HttpResponse, AppError>{
    let mut report = report.into_inner();
    report.module_id = report.module_id.trim().to_string();

    if report.module_id.is_empty(){
        return Err(AppError::bad_request("Module id is required"));
    }
    if !(0.0..=100.0).contains(&report.progress){
        return Err(AppError::bad_request("Progress must be between 0 and 100"));
    }
    if !report.watch_time.is_finite() || report.watch_time < 0.0{
        return Err(AppError::bad_request("Watch time cannot be negative"));
    }

    let student = current_student(&data, &req).await?;
    let course = data.store.find_course_by_title(&student.course).await?;
    let modules = course.map(|c| c.modules).unwrap_or_default();

    if !modules.is_empty() && !modules.iter().any(|m| m.id == report.module_id){
        return Err(AppError::bad_request(format!("Unknown module: {}", report.module_id)));
    }

    let now = Utc::now();
    let mut records = data.store.module_progress(&student.email).await?;

    let merged = ModuleProgress::merge(
        records.iter().find(|r| r.module_id == report.module_id),
        &report,
        now,
    );
    data.store.save_module_progress(&student.email, merged.clone()).await?;

    records.retain(|r| r.module_id != merged.module_id);
    records.push(merged);

    let overall = overall_progress(&modules, &records, report.progress).max(student.progress);

    let mut changes = StudentChanges{ progress: Some(overall), ..Default::default() };
    if overall >= 100 && student.status != StudentStatus::Completed{
        changes.status = Some(StudentStatus::Completed);
    }
    data.store.update_student(&student.id, changes).await?;

    if overall >= 100 && student.progress < 100{
        tracing::info!(student = %student.email, course = %student.course, "course completed");
        mailer::deliver(data.mailer.as_ref(), Mail::CourseCompletion{
            to: student.email.clone(),
            name: student.name.clone(),
            course: student.course.clone(),
        }).await;
    }

    tracing::info!(
        student = %student.email,
        module = %report.module_id,
        progress = report.progress,
        watch_time = report.watch_time,
        overall,
        "progress recorded"
    );

    Ok(HttpResponse::Ok().json(ProgressAck{
        success: true,
        progress: AckedProgress{
            module_id: report.module_id,
            progress: report.progress,
            watch_time: report.watch_time,
            overall_progress: overall,
            last_updated: now,
        },
    }))
}

#[get("/certificates")]
pub async fn my_certificates(data:web::Data<GlobalState>, req:HttpRequest) -> Result<HttpResponse, AppError>{
    let student = current_student(&data, &req).await?;

    let certificates = data.store.list_certificates(&CertificateFilter::for_student(&student.id)).await?;

    Ok(HttpResponse::Ok().json(CertificateList{ certificates }))
}

#[cfg(test)]
mod tests{
    use actix_web::test::{self, TestRequest};
    use serde_json::json;

    use crate::{
        models::user::Role,
        schema::admin::StudentList,
        test_init_app::{self, bearer},
    };

    use super::*;

    #[actix_web::test]
    async fn test_dashboard_resumes_from_last_position(){
        let (app, _ctx) = test_init_app::init().await;
        let token = test_init_app::student_token(&app).await;

        let req = TestRequest::get().uri("/api/student/dashboard").insert_header(bearer(&token)).to_request();
        let res: StudentDashboard = test::call_and_read_body_json(&app, req).await;

        assert_eq!(res.student.email, "john@example.com");
        assert_eq!(res.course.unwrap().title, "Professional Hair Styling");
        assert_eq!(res.progress.completed_modules, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(res.progress.module_progress["3"].last_position, 1200.0);
        assert!(!res.progress.module_progress["4"].completed);
    }

    #[actix_web::test]
    async fn test_progress_validation(){
        let (app, _ctx) = test_init_app::init().await;
        let token = test_init_app::student_token(&app).await;

        let bodies = [
            json!({"moduleId": "3", "progress": 101, "watchTime": 10}),
            json!({"moduleId": "3", "progress": -1, "watchTime": 10}),
            json!({"moduleId": " ", "progress": 50, "watchTime": 10}),
            json!({"moduleId": "99", "progress": 50, "watchTime": 10}),
        ];

        for body in bodies{
            let req = TestRequest::post().uri("/api/student/progress").insert_header(bearer(&token)).set_json(&body).to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 400, "{}", body);
        }
    }

    #[actix_web::test]
    async fn test_module_reports_drive_overall_progress(){
        let (app, ctx) = test_init_app::init().await;
        let token = test_init_app::student_token(&app).await;

        // modules 1 and 2 are done already; finishing 3 and 4 completes the course
        let mut overall = 0;
        for module_id in ["3", "4"]{
            let req = TestRequest::post()
                .uri("/api/student/progress")
                .insert_header(bearer(&token))
                .set_json(json!({"moduleId": module_id, "progress": 96.5, "watchTime": 2400}))
                .to_request();
            let ack: ProgressAck = test::call_and_read_body_json(&app, req).await;
            assert!(ack.success);
            overall = ack.progress.overall_progress;
        }
        assert_eq!(overall, 100);

        let req = TestRequest::get().uri("/api/student/dashboard").insert_header(bearer(&token)).to_request();
        let res: StudentDashboard = test::call_and_read_body_json(&app, req).await;
        assert_eq!(res.student.status, StudentStatus::Completed);
        assert_eq!(res.progress.completed_modules.len(), 4);

        // replaying a finished module does not congratulate twice
        let req = TestRequest::post()
            .uri("/api/student/progress")
            .insert_header(bearer(&token))
            .set_json(json!({"moduleId": "4", "progress": 100, "watchTime": 2700}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        assert_eq!(ctx.mailer.sent(), vec![Mail::CourseCompletion{
            to: "john@example.com".to_string(),
            name: "John Doe".to_string(),
            course: "Professional Hair Styling".to_string(),
        }]);
    }

    #[actix_web::test]
    async fn test_completion_makes_student_eligible(){
        let (app, _ctx) = test_init_app::init().await;
        let student = test_init_app::login(&app, Role::Student, "student@thefringe.com", "student123").await;
        let admin = test_init_app::admin_token(&app).await;

        let mut overall = 0;
        for module_id in ["1", "2", "3", "4"]{
            let req = TestRequest::post()
                .uri("/api/student/progress")
                .insert_header(bearer(&student))
                .set_json(json!({"moduleId": module_id, "progress": 100, "watchTime": 300}))
                .to_request();
            let ack: ProgressAck = test::call_and_read_body_json(&app, req).await;
            overall = ack.progress.overall_progress;
        }
        assert_eq!(overall, 100);

        let req = TestRequest::get().uri("/api/admin/certificates/eligible").insert_header(bearer(&admin)).to_request();
        let eligible: StudentList = test::call_and_read_body_json(&app, req).await;
        assert!(eligible.students.iter().any(|s| s.email == "student@thefringe.com"));
    }

    #[actix_web::test]
    async fn test_course_without_modules_takes_reported_value(){
        let (app, _ctx) = test_init_app::init().await;
        let admin = test_init_app::admin_token(&app).await;

        let req = TestRequest::post()
            .uri("/api/admin/students")
            .insert_header(bearer(&admin))
            .set_json(json!({"name": "Nina", "email": "nina@example.com", "course": "Skin Care Specialist", "password": "nina1234"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        let token = test_init_app::login(&app, Role::Student, "nina@example.com", "nina1234").await;
        let req = TestRequest::post()
            .uri("/api/student/progress")
            .insert_header(bearer(&token))
            .set_json(json!({"moduleId": "intro", "progress": 40, "watchTime": 90}))
            .to_request();
        let ack: ProgressAck = test::call_and_read_body_json(&app, req).await;

        assert_eq!(ack.progress.overall_progress, 40);
    }

    #[actix_web::test]
    async fn test_rewinding_never_lowers_progress(){
        let (app, _ctx) = test_init_app::init().await;
        let token = test_init_app::student_token(&app).await;

        let req = TestRequest::post()
            .uri("/api/student/progress")
            .insert_header(bearer(&token))
            .set_json(json!({"moduleId": "1", "progress": 5, "watchTime": 30}))
            .to_request();
        let ack: ProgressAck = test::call_and_read_body_json(&app, req).await;

        assert!(ack.progress.overall_progress >= 65);

        let req = TestRequest::get().uri("/api/student/dashboard").insert_header(bearer(&token)).to_request();
        let res: StudentDashboard = test::call_and_read_body_json(&app, req).await;
        assert!(res.progress.module_progress["1"].completed);
        assert_eq!(res.progress.module_progress["1"].last_position, 30.0);
    }

    #[actix_web::test]
    async fn test_student_sees_own_certificates_only(){
        let (app, ctx) = test_init_app::init().await;
        let token = test_init_app::student_token(&app).await;

        for (student_id, name) in [("5", "John Doe"), ("7", "Demo Student")]{
            ctx.state.store.create_certificate(crate::models::certificate::NewCertificate{
                student_id: student_id.to_string(),
                student_name: name.to_string(),
                course_name: "Professional Hair Styling".to_string(),
                completion_date: Utc::now(),
                certificate_url: format!("/uploads/certificates/{}_1.pdf", student_id),
                generated_by: "admin@thefringe.com".to_string(),
            }).await.unwrap();
        }

        let req = TestRequest::get().uri("/api/student/certificates").insert_header(bearer(&token)).to_request();
        let res: CertificateList = test::call_and_read_body_json(&app, req).await;

        assert_eq!(res.certificates.len(), 1);
        assert_eq!(res.certificates[0].student_id, "5");
    }
}
