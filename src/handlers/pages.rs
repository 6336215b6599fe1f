use std::path::{Path, PathBuf};

use actix_web::{web, HttpRequest, HttpResponse};

use crate::{errors::AppError, GlobalState};

/// Serves the site's pages and uploaded files out of the public directory. Directory
/// paths resolve to their `index.html`.
pub async fn serve_page(req:HttpRequest, data:web::Data<GlobalState>) -> Result<HttpResponse, AppError>{
    let path = resolve(&data.config.public_dir, req.path()).ok_or_else(|| AppError::not_found("Page"))?;

    match tokio::fs::read(&path).await{
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            Ok(HttpResponse::Ok().content_type(mime.to_string()).body(bytes))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::not_found("Page")),
        Err(e) => Err(e.into()),
    }
}

fn resolve(root:&Path, url_path:&str) -> Option<PathBuf>{
    let mut path = root.to_path_buf();

    for segment in url_path.split('/').filter(|s| !s.is_empty()){
        if segment == "." || segment == ".." || segment.contains('\\'){
            return None;
        }
        path.push(segment);
    }

    if path.extension().is_none(){
        path.push("index.html");
    }

    Some(path)
}

#[cfg(test)]
mod tests{
    use actix_web::test::{self, TestRequest};
    use actix_web::cookie::Cookie;

    use crate::{middlewares::{ROLE_COOKIE, TOKEN_COOKIE}, test_init_app};

    use super::*;

    #[test]
    fn resolve_rejects_traversal(){
        let root = Path::new("/srv/public");

        assert_eq!(resolve(root, "/"), Some(root.join("index.html")));
        assert_eq!(resolve(root, "/about"), Some(root.join("about").join("index.html")));
        assert_eq!(resolve(root, "/uploads/certificates/5_1.pdf"), Some(root.join("uploads/certificates/5_1.pdf")));
        assert_eq!(resolve(root, "/uploads/../../etc/passwd"), None);
    }

    #[actix_web::test]
    async fn test_home_page_is_public(){
        let (app, _ctx) = test_init_app::init().await;

        let req = TestRequest::get().uri("/").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 200);
        assert!(res.headers().get("content-type").unwrap().to_str().unwrap().starts_with("text/html"));
    }

    #[actix_web::test]
    async fn test_admin_pages_redirect_without_session(){
        let (app, _ctx) = test_init_app::init().await;

        let req = TestRequest::get().uri("/admin/dashboard").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 302);
        assert_eq!(res.headers().get("location").unwrap(), "/admin/login");

        let req = TestRequest::get()
            .uri("/admin/dashboard")
            .cookie(Cookie::new(TOKEN_COOKIE, "token"))
            .cookie(Cookie::new(ROLE_COOKIE, "student"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 302);
    }

    #[actix_web::test]
    async fn test_pages_come_from_public_dir(){
        let (app, ctx) = test_init_app::init().await;
        std::fs::create_dir_all(ctx.public_dir.path().join("admin/dashboard")).unwrap();
        std::fs::write(ctx.public_dir.path().join("admin/dashboard/index.html"), "admin").unwrap();

        let req = TestRequest::get()
            .uri("/admin/dashboard")
            .cookie(Cookie::new(TOKEN_COOKIE, "token"))
            .cookie(Cookie::new(ROLE_COOKIE, "admin"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = TestRequest::get().uri("/about").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}
