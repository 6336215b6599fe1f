use actix_web::{delete, get, patch, post, put, web::{self, Json}, HttpResponse};
use chrono::Utc;

use crate::{
    errors::AppError,
    mailer::{self, Mail},
    models::{
        newsletter::is_valid_email,
        student::{NewStudent, StudentFilter, StudentStatus},
        user::{Role, UserAccount},
    },
    schema::{admin::{CreateStudent, DeleteResponse, StudentList, StudentResponse, UpdateStudent}, ListQuery},
    utils::{generate_temporary_password, hash_password},
    GlobalState,
};

use super::parse_status;

#[get("")]
pub async fn list_students(data:web::Data<GlobalState>, query:web::Query<ListQuery>) -> Result<HttpResponse, AppError>{
    let filter = StudentFilter{
        status: parse_status(query.status.as_deref())?,
        search: query.search(),
    };

    let students = data.store.list_students(&filter).await?;

    Ok(HttpResponse::Ok().json(StudentList{ students }))
}

#[post("")]
pub async fn create_student(data:web::Data<GlobalState>, student:Json<CreateStudent>) -> Result<HttpResponse, AppError>{
    let student = student.into_inner();

    let name = student.name.trim().to_string();
    let email = student.email.trim().to_lowercase();
    let course = student.course.trim().to_string();

    if name.is_empty() || email.is_empty() || course.is_empty(){
        return Err(AppError::bad_request("Name, email and course are required"));
    }

    if !is_valid_email(&email){
        return Err(AppError::bad_request("Invalid email address"));
    }

    // logins are keyed by email too, an admin address must never become a student
    if data.store.find_student_by_email(&email).await?.is_some() || data.store.find_account(&email).await?.is_some(){
        return Err(AppError::bad_request("Email already exists"));
    }

    let password = student.password
        .filter(|p| !p.is_empty())
        .unwrap_or_else(generate_temporary_password);

    let password_hash = hash_password(&password).map_err(|e|{
        tracing::error!(error = %e, "could not hash student password");
        AppError::InternalError
    })?;

    let created = data.store.create_student(NewStudent{
        name,
        email: email.clone(),
        course,
        enrollment_date: Utc::now().date_naive(),
    }).await?;

    if !data.store.create_account(UserAccount{ email: email.clone(), password_hash, role: Role::Student }).await?{
        tracing::warn!(%email, "login already exists, left unchanged");
    }

    tracing::info!(id = %created.id, email = %created.email, "student created");

    mailer::deliver(data.mailer.as_ref(), Mail::StudentInvitation{
        to: created.email.clone(),
        name: created.name.clone(),
        password,
    }).await;

    Ok(HttpResponse::Created().json(StudentResponse{ success: true, student: created }))
}

#[put("/{id}")]
pub async fn update_student(data:web::Data<GlobalState>, path:web::Path<String>, changes:Json<UpdateStudent>) -> Result<HttpResponse, AppError>{
    apply_update(&data, &path.into_inner(), changes.into_inner()).await
}

#[patch("/{id}")]
pub async fn patch_student(data:web::Data<GlobalState>, path:web::Path<String>, changes:Json<UpdateStudent>) -> Result<HttpResponse, AppError>{
    apply_update(&data, &path.into_inner(), changes.into_inner()).await
}

#[delete("/{id}")]
pub async fn delete_student(data:web::Data<GlobalState>, path:web::Path<String>) -> Result<HttpResponse, AppError>{
    let id = path.into_inner();

    let student = data.store.get_student(&id).await?.ok_or_else(|| AppError::not_found("Student"))?;

    if !data.store.delete_student(&id).await?{
        return Err(AppError::not_found("Student"));
    }
    data.store.remove_student_login(&student.email).await?;

    tracing::info!(%id, email = %student.email, "student deleted");

    Ok(HttpResponse::Ok().json(DeleteResponse{ success: true, id }))
}

async fn apply_update(state:&GlobalState, id:&str, mut changes:UpdateStudent) -> Result<HttpResponse, AppError>{

    if let Some(progress) = changes.progress{
        if !(0..=100).contains(&progress){
            return Err(AppError::bad_request("Progress must be between 0 and 100"));
        }
        // finishing the course through the admin panel completes the enrollment too
        if progress == 100 && changes.status.is_none(){
            changes.status = Some(StudentStatus::Completed);
        }
    }

    let current = state.store.get_student(id).await?.ok_or_else(|| AppError::not_found("Student"))?;

    if let Some(email) = changes.email.as_mut(){
        *email = email.trim().to_lowercase();

        if !is_valid_email(email){
            return Err(AppError::bad_request("Invalid email address"));
        }

        if !email.eq_ignore_ascii_case(&current.email){
            let taken_by_student = state.store.find_student_by_email(email).await?.is_some_and(|other| other.id != id);
            if taken_by_student || state.store.find_account(email).await?.is_some(){
                return Err(AppError::bad_request("Email already exists"));
            }
        }
    }

    let new_email = changes.email.clone().filter(|e| !e.eq_ignore_ascii_case(&current.email));

    let student = state.store
        .update_student(id, changes.into())
        .await?
        .ok_or_else(|| AppError::not_found("Student"))?;

    if let Some(new_email) = new_email{
        state.store.move_student_login(&current.email, &new_email).await?;
        tracing::info!(%id, from = %current.email, to = %new_email, "student email changed");
    }

    Ok(HttpResponse::Ok().json(StudentResponse{ success: true, student }))
}
