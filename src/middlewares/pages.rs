use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
    Error, HttpResponse,
};

use crate::models::user::Role;

use super::{ROLE_COOKIE, TOKEN_COOKIE};

/// Prefixes reachable without a session. `/` itself is matched exactly.
const PUBLIC_PREFIXES: &[&str] = &[
    "/login",
    "/admin/login",
    "/student/login",
    "/about",
    "/courses",
    "/services",
    "/contact",
    "/book-now",
    "/team",
    "/reviews",
];

#[derive(Debug, PartialEq, Eq)]
pub enum PageAccess {
    Allow,
    Redirect(&'static str),
}

fn is_public(path: &str) -> bool {
    path == "/" || PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

fn is_area(path: &str, area: &str) -> bool {
    path == area || path.starts_with(&format!("{}/", area))
}

/// Decides whether a page request may proceed, given the `authToken` and `userRole`
/// cookie values.
pub fn check_page(path: &str, token: Option<&str>, role: Option<&str>) -> PageAccess {
    if is_public(path) {
        return PageAccess::Allow;
    }

    let area = if is_area(path, "/admin") {
        Some(Role::Admin)
    } else if is_area(path, "/student") {
        Some(Role::Student)
    } else {
        None
    };

    let has_token = token.is_some_and(|t| !t.is_empty());

    match area {
        Some(required) => {
            let role_ok = role.and_then(|r| r.parse::<Role>().ok()) == Some(required);
            if has_token && role_ok {
                PageAccess::Allow
            } else {
                PageAccess::Redirect(required.login_page())
            }
        }
        None if has_token => PageAccess::Allow,
        None => PageAccess::Redirect("/login"),
    }
}

pub async fn page_guard(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let token = req.cookie(TOKEN_COOKIE);
    let role = req.cookie(ROLE_COOKIE);

    let access = check_page(
        req.path(),
        token.as_ref().map(|c| c.value()),
        role.as_ref().map(|c| c.value()),
    );

    if let PageAccess::Redirect(location) = access {
        tracing::debug!(path = %req.path(), %location, "redirecting page request");
        let res = HttpResponse::Found()
            .insert_header((header::LOCATION, location))
            .finish();
        return Ok(req.into_response(res).map_into_right_body());
    }

    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_pages_need_no_session() {
        assert_eq!(check_page("/", None, None), PageAccess::Allow);
        assert_eq!(check_page("/services/bridal", None, None), PageAccess::Allow);
        assert_eq!(check_page("/admin/login", None, None), PageAccess::Allow);
    }

    #[test]
    fn root_is_not_a_wildcard() {
        assert_eq!(check_page("/uploads/certificates/1.pdf", None, None), PageAccess::Redirect("/login"));
    }

    #[test]
    fn missing_token_goes_to_role_login() {
        assert_eq!(check_page("/admin/dashboard", None, Some("admin")), PageAccess::Redirect("/admin/login"));
        assert_eq!(check_page("/student/my-course", None, None), PageAccess::Redirect("/student/login"));
    }

    #[test]
    fn mismatched_role_is_redirected() {
        assert_eq!(check_page("/admin/students", Some("t"), Some("student")), PageAccess::Redirect("/admin/login"));
        assert_eq!(check_page("/student/dashboard", Some("t"), Some("admin")), PageAccess::Redirect("/student/login"));
        assert_eq!(check_page("/student/dashboard", Some("t"), Some("student")), PageAccess::Allow);
    }

    #[test]
    fn area_prefix_is_segment_aware() {
        assert_eq!(check_page("/administrator", Some("t"), Some("student")), PageAccess::Allow);
    }
}
