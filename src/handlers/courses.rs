use actix_web::{delete, get, patch, post, put, web::{self, Json}, HttpResponse};

use crate::{
    errors::AppError,
    models::course::{Course, CourseFilter, CourseStatus, NewCourse},
    schema::{admin::{CourseList, CourseResponse, CreateCourse, DeleteResponse, PatchCourse, UpdateCourse}, ListQuery},
    GlobalState,
};

use super::parse_status;

#[get("")]
pub async fn list_courses(data:web::Data<GlobalState>, query:web::Query<ListQuery>) -> Result<HttpResponse, AppError>{
    let filter = CourseFilter{
        status: parse_status(query.status.as_deref())?,
        search: query.search(),
    };

    let courses = data.store.list_courses(&filter).await?;

    Ok(HttpResponse::Ok().json(CourseList{ courses }))
}

#[post("")]
pub async fn create_course(data:web::Data<GlobalState>, course:Json<CreateCourse>) -> Result<HttpResponse, AppError>{
    let course = course.into_inner();

    let title = course.title.trim().to_string();
    if title.is_empty(){
        return Err(AppError::bad_request("Title is required"));
    }
    check_numbers(course.price, Some(course.max_students))?;

    let created = data.store.create_course(NewCourse{
        title,
        description: course.description,
        duration: course.duration,
        price: course.price,
        max_students: course.max_students,
        instructor: course.instructor,
        modules: course.modules,
    }).await?;

    tracing::info!(id = %created.id, title = %created.title, "course created");

    Ok(HttpResponse::Created().json(CourseResponse{ success: true, course: created }))
}

#[put("/{id}")]
pub async fn update_course(data:web::Data<GlobalState>, path:web::Path<String>, changes:Json<UpdateCourse>) -> Result<HttpResponse, AppError>{
    let changes = changes.into_inner();

    if changes.title.as_deref().is_some_and(|t| t.trim().is_empty()){
        return Err(AppError::bad_request("Title is required"));
    }
    check_numbers(changes.price, changes.max_students)?;

    let course = data.store
        .update_course(&path.into_inner(), changes.into())
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;

    Ok(HttpResponse::Ok().json(CourseResponse{ success: true, course }))
}

/// Sets the publication status. Repeating the same status leaves the course as is.
#[patch("/{id}")]
pub async fn patch_course(data:web::Data<GlobalState>, path:web::Path<String>, body:Json<PatchCourse>) -> Result<HttpResponse, AppError>{
    let id = path.into_inner();

    let course = data.store
        .update_course(&id, crate::models::course::CourseChanges::status(body.status))
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;

    tracing::info!(%id, status = course.status.as_str(), "course status set");

    Ok(HttpResponse::Ok().json(CourseResponse{ success: true, course }))
}

#[delete("/{id}")]
pub async fn delete_course(data:web::Data<GlobalState>, path:web::Path<String>) -> Result<HttpResponse, AppError>{
    let id = path.into_inner();

    if !data.store.delete_course(&id).await?{
        return Err(AppError::not_found("Course"));
    }

    tracing::info!(%id, "course deleted");

    Ok(HttpResponse::Ok().json(DeleteResponse{ success: true, id }))
}

#[get("")]
pub async fn public_courses(data:web::Data<GlobalState>, query:web::Query<ListQuery>) -> Result<HttpResponse, AppError>{
    let filter = CourseFilter{
        search: query.search(),
        ..CourseFilter::active()
    };

    let courses = data.store.list_courses(&filter).await?;
    let show_prices = data.store.get_settings().await?.show_prices;

    Ok(HttpResponse::Ok().json(CourseList{ courses: priced(courses, show_prices) }))
}

#[get("/{id}")]
pub async fn public_course(data:web::Data<GlobalState>, path:web::Path<String>) -> Result<HttpResponse, AppError>{
    let course = data.store
        .get_course(&path.into_inner())
        .await?
        .filter(|course| course.status == CourseStatus::Active)
        .ok_or_else(|| AppError::not_found("Course"))?;

    let show_prices = data.store.get_settings().await?.show_prices;
    let course = if show_prices { course } else { course.hide_price() };

    Ok(HttpResponse::Ok().json(CourseResponse{ success: true, course }))
}

fn priced(courses:Vec<Course>, show_prices:bool) -> Vec<Course>{
    if show_prices{
        courses
    }else{
        courses.into_iter().map(Course::hide_price).collect()
    }
}

fn check_numbers(price:Option<i32>, max_students:Option<i32>) -> Result<(), AppError>{
    if price.is_some_and(|p| p < 0){
        return Err(AppError::bad_request("Price cannot be negative"));
    }
    if max_students.is_some_and(|m| m < 0){
        return Err(AppError::bad_request("Max students cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests{
    use actix_web::test::{self, TestRequest};
    use serde_json::json;

    use crate::test_init_app::{self, bearer};

    use super::*;

    #[actix_web::test]
    async fn test_new_course_starts_as_draft(){
        let (app, _ctx) = test_init_app::init().await;
        let token = test_init_app::admin_token(&app).await;

        let req = TestRequest::post()
            .uri("/api/admin/courses")
            .insert_header(bearer(&token))
            .set_json(json!({"title": "Barbering Basics", "price": 450, "maxStudents": 8}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 201);

        let created: CourseResponse = test::read_body_json(res).await;
        assert_eq!(created.course.status, CourseStatus::Draft);
        assert_eq!(created.course.current_students, 0);

        // drafts stay off the public listing
        let req = TestRequest::get().uri(&format!("/api/courses/{}", created.course.id)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn test_status_toggle_is_idempotent(){
        let (app, _ctx) = test_init_app::init().await;
        let token = test_init_app::admin_token(&app).await;

        let mut seen = Vec::new();
        for _ in 0..2{
            let req = TestRequest::patch()
                .uri("/api/admin/courses/3")
                .insert_header(bearer(&token))
                .set_json(json!({"status": "active"}))
                .to_request();
            let res: CourseResponse = test::call_and_read_body_json(&app, req).await;
            seen.push(serde_json::to_value(&res.course).unwrap());
        }

        assert_eq!(seen[0], seen[1]);
        assert_eq!(seen[0]["status"], "active");

        let req = TestRequest::patch()
            .uri("/api/admin/courses/3")
            .insert_header(bearer(&token))
            .set_json(json!({"status": "published"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }

    #[actix_web::test]
    async fn test_public_courses_are_active_only(){
        let (app, _ctx) = test_init_app::init().await;

        let req = TestRequest::get().uri("/api/courses").to_request();
        let res: CourseList = test::call_and_read_body_json(&app, req).await;

        assert_eq!(res.courses.len(), 3);
        assert!(res.courses.iter().all(|c| c.status == CourseStatus::Active));

        let req = TestRequest::get().uri("/api/courses?search=hair").to_request();
        let res: CourseList = test::call_and_read_body_json(&app, req).await;
        assert_eq!(res.courses.len(), 1);
        assert_eq!(res.courses[0].title, "Professional Hair Styling");
    }

    #[actix_web::test]
    async fn test_hidden_prices_on_public_course(){
        let (app, _ctx) = test_init_app::init().await;
        let token = test_init_app::admin_token(&app).await;

        let req = TestRequest::put()
            .uri("/api/admin/settings")
            .insert_header(bearer(&token))
            .set_json(json!({"showPrices": false}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = TestRequest::get().uri("/api/courses/1").to_request();
        let res: CourseResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(res.course.price, None);

        // admins still see the real price
        let req = TestRequest::get().uri("/api/admin/courses?search=Professional").insert_header(bearer(&token)).to_request();
        let res: CourseList = test::call_and_read_body_json(&app, req).await;
        assert!(res.courses[0].price.is_some());
    }

    #[actix_web::test]
    async fn test_delete_unknown_course(){
        let (app, _ctx) = test_init_app::init().await;
        let token = test_init_app::admin_token(&app).await;

        let req = TestRequest::delete().uri("/api/admin/courses/99").insert_header(bearer(&token)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}
