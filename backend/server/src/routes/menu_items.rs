use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use crate::{
    auth::Caller,
    error::AppError,
    payloads::MenuItemPayload,
    policy::{Action, Resource, permit},
    state::AppState,
    utils::{ValidatedJson, non_empty},
};

pub async fn list_menu_items_handler(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<i64>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    let mut uow = state.store.begin().await?;

    let owner = uow
        .restaurants()
        .find(restaurant_id)
        .await?
        .and_then(|restaurant| restaurant.owner_user_id);
    permit(&caller, Action::ListMenuItems, Resource::OwnedBy(owner))?;

    let items = uow.menu_items().list_by_restaurant(restaurant_id).await?;

    Ok(Json(non_empty(items, "No menu items found for this restaurant.")?))
}

/// Visible to Admin and to the owner of the item's restaurant.
pub async fn get_menu_item_handler(
    State(state): State<Arc<AppState>>,
    Path(menu_item_id): Path<i64>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    let mut uow = state.store.begin().await?;

    let item = uow
        .menu_items()
        .find(menu_item_id)
        .await?
        .ok_or(AppError::NotFound("Menu item not found."))?;

    let owner = uow
        .restaurants()
        .find(item.restaurant_id)
        .await?
        .and_then(|restaurant| restaurant.owner_user_id);
    permit(&caller, Action::ViewMenuItem, Resource::OwnedBy(owner))?;

    Ok(Json(item))
}

pub async fn add_menu_item_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    payload: Result<ValidatedJson<MenuItemPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ManageMenuItems, Resource::Any)?;
    let ValidatedJson(payload) = payload?;

    let mut uow = state.store.begin().await?;

    if uow.restaurants().find(payload.restaurant_id).await?.is_none() {
        return Err(AppError::NotFound("Restaurant not found."));
    }

    let item = uow.menu_items().create(payload.into()).await?;

    uow.commit().await?;
    info!(
        "Added menu item {} to restaurant {}",
        item.menu_item_id, item.restaurant_id
    );

    Ok((StatusCode::CREATED, Json(item)))
}

/// The item keeps its restaurant, a different `restaurantId` in the body is ignored.
pub async fn update_menu_item_handler(
    State(state): State<Arc<AppState>>,
    Path(menu_item_id): Path<i64>,
    caller: Caller,
    payload: Result<ValidatedJson<MenuItemPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ManageMenuItems, Resource::Any)?;
    let ValidatedJson(payload) = payload?;

    let mut uow = state.store.begin().await?;

    let item = uow
        .menu_items()
        .update(menu_item_id, payload.into())
        .await?
        .ok_or(AppError::NotFound("Menu item not found."))?;

    uow.commit().await?;
    info!("Updated menu item {menu_item_id}");

    Ok(Json(item))
}

/// Cart lines holding the item go with it. Ordered items cannot be deleted.
pub async fn delete_menu_item_handler(
    State(state): State<Arc<AppState>>,
    Path(menu_item_id): Path<i64>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ManageMenuItems, Resource::Any)?;

    let mut uow = state.store.begin().await?;

    if uow.menu_items().find(menu_item_id).await?.is_none() {
        return Err(AppError::NotFound("Menu item not found."));
    }

    let carts = uow.carts().release_menu_item(menu_item_id).await?;
    uow.menu_items().delete(menu_item_id).await?;

    uow.commit().await?;
    info!("Deleted menu item {menu_item_id}, released from {carts} carts");

    Ok("Menu item deleted successfully.")
}
