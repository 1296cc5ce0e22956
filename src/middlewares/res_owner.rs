use std::future::{Ready, ready};

use crate::utils::jwt::Claims;
use actix_web::error::ErrorForbidden;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;

/// Lets a request through only when the path parameter `param_name` names
/// the authenticated user, or the user is an admin.
pub struct ResourceOwnership {
    pub param_name: String,
}

impl<S, B> Transform<S, ServiceRequest> for ResourceOwnership
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = ResourceOwnershipMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ResourceOwnershipMiddleware {
            service,
            param_name: self.param_name.clone(),
        }))
    }
}

pub struct ResourceOwnershipMiddleware<S> {
    service: S,
    param_name: String,
}

impl<S, B> Service<ServiceRequest> for ResourceOwnershipMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let (current_user_id, is_admin) = match req.extensions().get::<Claims>() {
            Some(claims) => (claims.user_id.clone(), claims.is_admin()),
            None => {
                return Box::pin(async move { Err(ErrorForbidden("User not authenticated")) });
            }
        };

        let resource_owner_id = req.match_info().get(&self.param_name).map(String::from);
        let Some(resource_owner_id) = resource_owner_id else {
            // not a per-user resource
            return Box::pin(self.service.call(req));
        };

        if !is_admin && current_user_id != resource_owner_id {
            return Box::pin(async move {
                Err(ErrorForbidden(
                    "Access denied: You can only access your own QR codes",
                ))
            });
        }

        Box::pin(self.service.call(req))
    }
}
