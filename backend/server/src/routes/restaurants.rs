use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use store::{RestaurantFields, Role, UnitOfWork};
use tracing::info;

use crate::{
    auth::Caller,
    error::AppError,
    payloads::RestaurantPayload,
    policy::{Action, Resource, permit},
    state::AppState,
    utils::{ValidatedJson, non_empty},
};

/// Admin sees every restaurant, a restaurant account only its own.
pub async fn list_restaurants_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ListRestaurants, Resource::Any)?;

    let mut uow = state.store.begin().await?;

    let restaurants = match caller.role {
        Role::Admin => uow.restaurants().list().await?,
        _ => uow.restaurants().list_by_owner(caller.id).await?,
    };

    Ok(Json(non_empty(restaurants, "No restaurants found.")?))
}

pub async fn get_restaurant_handler(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<i64>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    let mut uow = state.store.begin().await?;

    let restaurant = uow
        .restaurants()
        .find(restaurant_id)
        .await?
        .ok_or(AppError::NotFound("Restaurant not found."))?;
    permit(
        &caller,
        Action::ViewRestaurant,
        Resource::OwnedBy(restaurant.owner_user_id),
    )?;

    Ok(Json(restaurant))
}

pub async fn add_restaurant_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    payload: Result<ValidatedJson<RestaurantPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ManageRestaurants, Resource::Any)?;
    let ValidatedJson(payload) = payload?;

    let mut uow = state.store.begin().await?;

    // the creating admin owns the restaurant unless told otherwise
    let owner = payload.owner_user_id.unwrap_or(caller.id);
    ensure_user_exists(&mut uow, owner).await?;

    let restaurant = uow
        .restaurants()
        .create(RestaurantFields {
            name: payload.name,
            location: payload.location,
            contact_number: payload.contact_number,
            owner_user_id: Some(owner),
        })
        .await?;

    uow.commit().await?;
    info!(
        "Added restaurant {} owned by user {owner}",
        restaurant.restaurant_id
    );

    Ok((StatusCode::CREATED, Json(restaurant)))
}

pub async fn update_restaurant_handler(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<i64>,
    caller: Caller,
    payload: Result<ValidatedJson<RestaurantPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ManageRestaurants, Resource::Any)?;
    let ValidatedJson(payload) = payload?;

    let mut uow = state.store.begin().await?;

    let existing = uow
        .restaurants()
        .find(restaurant_id)
        .await?
        .ok_or(AppError::NotFound("Restaurant not found."))?;

    let owner = payload.owner_user_id.or(existing.owner_user_id);
    if let Some(owner) = payload.owner_user_id {
        ensure_user_exists(&mut uow, owner).await?;
    }

    let restaurant = uow
        .restaurants()
        .update(
            restaurant_id,
            RestaurantFields {
                name: payload.name,
                location: payload.location,
                contact_number: payload.contact_number,
                owner_user_id: owner,
            },
        )
        .await?
        .ok_or(AppError::NotFound("Restaurant not found."))?;

    uow.commit().await?;
    info!("Updated restaurant {restaurant_id}");

    Ok(Json(restaurant))
}

/// Menu items and orders of the restaurant go with it.
pub async fn delete_restaurant_handler(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<i64>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ManageRestaurants, Resource::Any)?;

    let mut uow = state.store.begin().await?;

    if uow.restaurants().find(restaurant_id).await?.is_none() {
        return Err(AppError::NotFound("Restaurant not found."));
    }

    uow.carts().release_restaurant(restaurant_id).await?;
    uow.restaurants().delete(restaurant_id).await?;

    uow.commit().await?;
    info!("Deleted restaurant {restaurant_id}");

    Ok("Restaurant deleted successfully.")
}

async fn ensure_user_exists(uow: &mut UnitOfWork, user_id: i64) -> Result<(), AppError> {
    if uow.users().find(user_id).await?.is_none() {
        return Err(AppError::NotFound("Owner not found."));
    }

    Ok(())
}
