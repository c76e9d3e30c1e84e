use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use store::{NewUser, StoreError};
use tracing::info;

use crate::{
    error::AppError,
    password::{hash_password, verify_password},
    payloads::{LoginPayload, RegisterPayload, TokenResponse},
    state::AppState,
    utils::ValidatedJson,
};

const EMAIL_TAKEN: &str = "Email already exists.";

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<RegisterPayload>,
) -> Result<impl IntoResponse, AppError> {
    let password_hash = hash_password(payload.password).await?;

    let mut uow = state.store.begin().await?;

    if uow.users().find_by_email(&payload.email).await?.is_some() {
        return Err(AppError::BadRequest(EMAIL_TAKEN.into()));
    }

    let user = uow
        .users()
        .create(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            address: payload.address,
            contact_number: payload.contact_number,
            role: payload.role,
        })
        .await
        .map_err(|e| match e {
            StoreError::NotUnique => AppError::BadRequest(EMAIL_TAKEN.into()),
            e => e.into(),
        })?;

    uow.commit().await?;
    info!("Registered user {} as {}", user.user_id, user.role);

    Ok((StatusCode::OK, "User registered successfully."))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut uow = state.store.begin().await?;
    let user = uow
        .users()
        .find_by_email(&payload.email)
        .await?
        .ok_or(AppError::Unauthorized)?;
    drop(uow);

    if !verify_password(payload.password, user.password_hash.clone()).await? {
        return Err(AppError::Unauthorized);
    }

    let token = state.tokens.issue(&user)?;
    info!("User {} logged in", user.user_id);

    Ok(Json(TokenResponse { token }))
}
