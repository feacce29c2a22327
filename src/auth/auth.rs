use crate::config::Config;
use crate::error::ApiError;
use crate::{model::role::Role, models::{Claims, TokenType}};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::decode;
use jsonwebtoken::{DecodingKey, Validation};

fn unauthorized(message: &str) -> actix_web::Error {
    ApiError::Unauthorized(message.to_string()).into()
}

/// The acting identity: user, company scope, role, and the linked employee
/// profile when one exists. Every core operation receives this explicitly.
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
    pub company_id: u64,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(unauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(unauthorized("Invalid token"))),
        };

        if data.claims.token_type != TokenType::Access {
            return ready(Err(unauthorized("Not an access token")));
        }

        let role = match Role::from_id(data.claims.role) {
            Some(r) => r,
            None => return ready(Err(unauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            username: data.claims.sub,
            role,
            company_id: data.claims.company_id,
            employee_id: data.claims.employee_id,
        }))
    }
}

impl AuthUser {
    pub fn require_elevated(&self) -> Result<(), ApiError> {
        if self.role.is_elevated() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Requires an elevated administrative role".to_string(),
            ))
        }
    }

    pub fn require_hr(&self) -> Result<(), ApiError> {
        if self.role.can_finalize() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("HR/Admin only".to_string()))
        }
    }

    pub fn require_supervisor(&self) -> Result<(), ApiError> {
        if self.role.can_supervise() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Supervisor or above only".to_string()))
        }
    }

    pub fn require_attendance_manager(&self) -> Result<(), ApiError> {
        if self.role.can_manage_attendance() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("HR/Admin only".to_string()))
        }
    }

    /// The linked employee profile, required for self-service operations.
    pub fn employee_id(&self) -> Result<u64, ApiError> {
        self.employee_id
            .ok_or_else(|| ApiError::Forbidden("No employee profile".to_string()))
    }
}
