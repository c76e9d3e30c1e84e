use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::info;

use crate::{
    auth::Caller,
    error::AppError,
    payloads::{ProfileUpdatePayload, UserProfile},
    policy::{Action, Resource, permit},
    state::AppState,
    utils::{ValidatedJson, non_empty},
};

pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ManageUsers, Resource::Any)?;

    let mut uow = state.store.begin().await?;
    let users = non_empty(uow.users().list().await?, "No users found.")?;

    let profiles: Vec<UserProfile> = users.into_iter().map(UserProfile::from).collect();

    Ok(Json(profiles))
}

pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ManageUsers, Resource::Any)?;

    let mut uow = state.store.begin().await?;
    let user = uow
        .users()
        .find(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found."))?;

    Ok(Json(UserProfile::from(user)))
}

pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ViewProfile, Resource::Any)?;

    let mut uow = state.store.begin().await?;
    let user = uow
        .users()
        .find(caller.id)
        .await?
        .ok_or(AppError::NotFound("User not found."))?;

    Ok(Json(UserProfile::from(user)))
}

/// Partial update, absent fields keep their stored values.
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ValidatedJson(payload): ValidatedJson<ProfileUpdatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut uow = state.store.begin().await?;

    let user = uow
        .users()
        .find(caller.id)
        .await?
        .ok_or(AppError::NotFound("User not found."))?;
    permit(&caller, Action::UpdateProfile, Resource::OwnedBy(Some(user.user_id)))?;

    if let Some(email) = payload.email.as_deref().filter(|email| *email != user.email) {
        if uow.users().find_by_email(email).await?.is_some() {
            return Err(AppError::BadRequest("Email already exists.".into()));
        }
    }

    let updated = uow
        .users()
        .update_profile(user.user_id, payload.into())
        .await?
        .ok_or(AppError::NotFound("User not found."))?;

    uow.commit().await?;
    info!("Updated profile of user {}", updated.user_id);

    Ok(Json(UserProfile::from(updated)))
}

/// Removes the account with its cart and orders.
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ManageUsers, Resource::Any)?;

    let mut uow = state.store.begin().await?;

    if !uow.users().delete(user_id).await? {
        return Err(AppError::NotFound("User not found."));
    }

    uow.commit().await?;
    info!("Deleted user {user_id}");

    Ok("User deleted successfully.")
}

pub async fn own_orders_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ViewOwnOrders, Resource::Any)?;

    let mut uow = state.store.begin().await?;
    let orders = uow.orders().list_details_by_user(caller.id).await?;

    Ok(Json(non_empty(orders, "No orders found for this user.")?))
}

pub async fn my_restaurant_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ViewOwnRestaurant, Resource::Any)?;

    let mut uow = state.store.begin().await?;
    let restaurant = uow
        .restaurants()
        .list_by_owner(caller.id)
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::NotFound("Restaurant not found for this user."))?;

    Ok(Json(restaurant))
}
