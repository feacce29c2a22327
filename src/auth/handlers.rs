use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::verify_password,
    },
    config::Config,
    models::{LoginReqDto, RefreshReqDto, TokenType, UserSql},
};
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::instrument;

#[derive(Serialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let row = sqlx::query_as::<_, UserSql>(
        "SELECT id, username, password, role_id, company_id, employee_id \
         FROM users WHERE username = ?",
    )
    .bind(&user.username)
    .fetch_optional(pool.get_ref())
    .await;

    let row = match row {
        Ok(Some(row)) => row,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(json!({
                "error": "Invalid username or password"
            }));
        }
        Err(e) => {
            tracing::error!(error = %e, "Login lookup failed");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal Server Error"
            }));
        }
    };

    if verify_password(&user.password, &row.password).is_err() {
        return HttpResponse::Unauthorized().json(json!({
            "error": "Invalid username or password"
        }));
    }

    let access_token = generate_access_token(
        row.id,
        row.username.clone(),
        row.role_id,
        row.company_id,
        row.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );
    let refresh_token = generate_refresh_token(
        row.id,
        row.username,
        row.role_id,
        row.company_id,
        row.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

pub async fn refresh_token(
    body: web::Json<RefreshReqDto>,
    config: web::Data<Config>,
) -> impl Responder {
    let claims = match verify_token(&body.refresh_token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            return HttpResponse::Unauthorized().json(json!({
                "error": "Invalid or expired refresh token",
                "details": e
            }));
        }
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().json(json!({
            "error": "Not a refresh token"
        }));
    }

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub,
        claims.role,
        claims.company_id,
        claims.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(json!({ "access_token": access_token }))
}
