use actix_multipart::{Field, Multipart};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use futures_util::StreamExt;

use crate::{
    config::UPLOAD_URL_PREFIX,
    errors::AppError,
    models::{
        certificate::{CertificateFilter, CertificateStatus, NewCertificate},
        student::{StudentChanges, StudentFilter},
    },
    schema::{admin::{CertificateList, CertificateResponse, StudentList}, ListQuery},
    GlobalState,
};

use super::{parse_status, session};

pub const ALLOWED_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/jpg", "image/png"];

const MAX_TEXT_FIELD_BYTES: usize = 4 * 1024;

#[get("")]
pub async fn list_certificates(data:web::Data<GlobalState>, query:web::Query<ListQuery>) -> Result<HttpResponse, AppError>{
    let filter = CertificateFilter{
        status: parse_status(query.status.as_deref())?,
        search: query.search(),
        student_id: None,
    };

    let certificates = data.store.list_certificates(&filter).await?;

    Ok(HttpResponse::Ok().json(CertificateList{ certificates }))
}

/// Students who finished their course and can receive a certificate.
#[get("/eligible")]
pub async fn eligible_students(data:web::Data<GlobalState>) -> Result<HttpResponse, AppError>{
    let students = data.store
        .list_students(&StudentFilter::default())
        .await?
        .into_iter()
        .filter(|s| s.is_certificate_eligible())
        .collect();

    Ok(HttpResponse::Ok().json(StudentList{ students }))
}

#[post("/{id}/revoke")]
pub async fn revoke_certificate(data:web::Data<GlobalState>, path:web::Path<String>) -> Result<HttpResponse, AppError>{
    let id = path.into_inner();

    let certificate = data.store
        .set_certificate_status(&id, CertificateStatus::Revoked)
        .await?
        .ok_or_else(|| AppError::not_found("Certificate"))?;

    tracing::info!(%id, student = %certificate.student_id, "certificate revoked");

    Ok(HttpResponse::Ok().json(CertificateResponse{
        success: true,
        message: "Certificate revoked".to_string(),
        certificate,
    }))
}

#[post("/upload")]
pub async fn upload_certificate(data:web::Data<GlobalState>, req:HttpRequest, mut payload:Multipart) -> Result<HttpResponse, AppError>{
    let admin = session(&req)?;
    let config = &data.config;

    let form = UploadForm::read(&mut payload, config.max_upload_bytes).await?;

    let (Some(file), Some(student_id), Some(student_name), Some(course_name)) =
        (form.file, form.student_id, form.student_name, form.course_name)
    else {
        return Err(AppError::bad_request("Missing required fields"));
    };

    let content_type = file.content_type.as_deref().unwrap_or_default();
    if !ALLOWED_TYPES.contains(&content_type){
        tracing::info!(%student_id, %content_type, "certificate upload rejected: file type");
        return Err(AppError::bad_request("Invalid file type. Only PDF, JPG, JPEG and PNG are allowed."));
    }

    if file.too_large{
        tracing::info!(%student_id, "certificate upload rejected: file size");
        return Err(AppError::bad_request(format!(
            "File size too large. Maximum {}MB allowed.",
            config.max_upload_bytes / (1024 * 1024)
        )));
    }

    let file_name = format!(
        "{}_{}.{}",
        safe_segment(&student_id),
        Utc::now().timestamp_millis(),
        extension(content_type)
    );

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    tokio::fs::write(config.upload_dir.join(&file_name), &file.bytes).await?;

    let certificate_url = format!("{}/{}", UPLOAD_URL_PREFIX, file_name);

    let certificate = data.store.create_certificate(NewCertificate{
        student_id: student_id.clone(),
        student_name,
        course_name,
        completion_date: Utc::now(),
        certificate_url: certificate_url.clone(),
        generated_by: admin.email,
    }).await?;

    let changes = StudentChanges{ certificate_url: Some(certificate_url), ..Default::default() };
    if data.store.update_student(&student_id, changes).await?.is_none(){
        tracing::warn!(%student_id, "certificate stored for an unknown student");
    }

    tracing::info!(
        id = %certificate.id,
        %student_id,
        %file_name,
        original = file.file_name.as_deref().unwrap_or_default(),
        bytes = file.bytes.len(),
        "certificate uploaded"
    );

    Ok(HttpResponse::Ok().json(CertificateResponse{
        success: true,
        message: "Certificate uploaded successfully".to_string(),
        certificate,
    }))
}

struct UploadedFile{
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
    too_large: bool,
}

#[derive(Default)]
struct UploadForm{
    file: Option<UploadedFile>,
    student_id: Option<String>,
    student_name: Option<String>,
    course_name: Option<String>,
}

impl UploadForm{
    /// Collects the form in memory. A file over `max_bytes` is drained but not kept,
    /// so nothing oversized ever reaches the disk.
    async fn read(payload:&mut Multipart, max_bytes:usize) -> Result<Self, AppError>{
        let mut form = UploadForm::default();

        while let Some(field) = payload.next().await{
            let mut field = field.map_err(|e| AppError::bad_request(e.to_string()))?;
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str(){
                "certificate" => {
                    let file_name = field
                        .content_disposition()
                        .and_then(|cd| cd.get_filename())
                        .map(str::to_string);
                    let content_type = field.content_type().map(|m| m.essence_str().to_string());
                    let (bytes, too_large) = read_field(&mut field, max_bytes).await?;

                    form.file = Some(UploadedFile{ file_name, content_type, bytes, too_large });
                }
                "studentId" => form.student_id = read_text(&mut field).await?,
                "studentName" => form.student_name = read_text(&mut field).await?,
                "courseName" => form.course_name = read_text(&mut field).await?,
                _ => {
                    read_field(&mut field, 0).await?;
                }
            }
        }

        Ok(form)
    }
}

async fn read_field(field:&mut Field, max_bytes:usize) -> Result<(Vec<u8>, bool), AppError>{
    let mut bytes = Vec::new();
    let mut too_large = false;

    while let Some(chunk) = field.next().await{
        let chunk = chunk.map_err(|e| AppError::bad_request(e.to_string()))?;
        if too_large || bytes.len() + chunk.len() > max_bytes{
            too_large = true;
            bytes.clear();
            continue;
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok((bytes, too_large))
}

async fn read_text(field:&mut Field) -> Result<Option<String>, AppError>{
    let (bytes, too_large) = read_field(field, MAX_TEXT_FIELD_BYTES).await?;
    if too_large{
        return Err(AppError::bad_request("Form field too long"));
    }

    let text = String::from_utf8(bytes).map_err(|_| AppError::bad_request("Form fields must be UTF-8"))?;
    let text = text.trim();

    Ok((!text.is_empty()).then(|| text.to_string()))
}

/// Keeps ids usable as a file name component.
fn safe_segment(raw:&str) -> String{
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// File extension for an allowed content type. The client's file name is ignored so the
/// stored file is always served back as the type that was checked.
fn extension(content_type:&str) -> &'static str{
    match content_type{
        "application/pdf" => "pdf",
        "image/png" => "png",
        _ => "jpg",
    }
}
