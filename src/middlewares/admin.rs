use actix_web::{body::MessageBody, dev::{ServiceRequest, ServiceResponse}, middleware::Next, Error, HttpMessage};

use crate::models::user::Role;

use super::authorize;

pub async fn admin_middleware(
    req:ServiceRequest,
    next: Next<impl MessageBody>
) -> Result<ServiceResponse<impl MessageBody>, Error>{

    let session = authorize(&req, Role::Admin)?;

    req.extensions_mut().insert(session);

    next.call(req).await
}
