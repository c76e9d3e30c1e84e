//! Cart handlers.
//!
//! Each user has at most one cart, created on the first add. `totalPrice` is
//! moved by every line mutation in the same unit of work.
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use store::Money;
use tracing::info;

use crate::{
    auth::Caller,
    error::AppError,
    payloads::{CartItemPayload, QuantityPayload},
    policy::{Action, Resource, permit},
    state::AppState,
    utils::ValidatedJson,
};

pub async fn get_cart_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ViewCart, Resource::OwnedBy(Some(caller.id)))?;

    let mut uow = state.store.begin().await?;
    let cart = uow
        .carts()
        .find_details(caller.id)
        .await?
        .ok_or(AppError::NotFound("Cart not found."))?;

    Ok(Json(cart))
}

pub async fn add_to_cart_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    payload: Result<ValidatedJson<CartItemPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::EditCart, Resource::OwnedBy(Some(caller.id)))?;
    let ValidatedJson(payload) = payload?;

    let mut uow = state.store.begin().await?;

    if uow.menu_items().find(payload.menu_item_id).await?.is_none() {
        return Err(AppError::NotFound("Menu item not found."));
    }

    let cart = match uow.carts().find_by_user(caller.id).await? {
        Some(cart) => cart,
        None => uow.carts().create(caller.id).await?,
    };

    let line = payload.line();
    let item = uow.cart_items().add(cart.cart_id, line).await?;
    uow.carts()
        .adjust_total(cart.cart_id, line.price.times(line.quantity)?)
        .await?;

    uow.commit().await?;
    info!("Added cart item {} to cart {}", item.cart_item_id, cart.cart_id);

    Ok("Item added to cart.")
}

pub async fn update_cart_item_handler(
    State(state): State<Arc<AppState>>,
    Path(cart_item_id): Path<i64>,
    caller: Caller,
    payload: Result<ValidatedJson<QuantityPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    // role only, ownership of the line is checked once it is loaded
    permit(&caller, Action::EditCart, Resource::OwnedBy(Some(caller.id)))?;
    let ValidatedJson(payload) = payload?;

    let mut uow = state.store.begin().await?;

    let item = uow
        .cart_items()
        .find(cart_item_id)
        .await?
        .ok_or(AppError::NotFound("Cart item not found."))?;
    let owner = uow.cart_items().owner(cart_item_id).await?;
    permit(&caller, Action::EditCart, Resource::OwnedBy(owner))?;

    let updated = uow
        .cart_items()
        .set_quantity(cart_item_id, payload.quantity)
        .await?
        .ok_or(AppError::NotFound("Cart item not found."))?;

    let delta = item.price.times(payload.quantity - item.quantity)?;
    uow.carts().adjust_total(item.cart_id, delta).await?;

    uow.commit().await?;
    info!(
        "Cart item {cart_item_id} quantity {} -> {}",
        item.quantity, updated.quantity
    );

    Ok(Json(updated))
}

pub async fn remove_cart_item_handler(
    State(state): State<Arc<AppState>>,
    Path(cart_item_id): Path<i64>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::EditCart, Resource::OwnedBy(Some(caller.id)))?;

    let mut uow = state.store.begin().await?;

    let item = uow
        .cart_items()
        .find(cart_item_id)
        .await?
        .ok_or(AppError::NotFound("Cart item not found."))?;
    let owner = uow.cart_items().owner(cart_item_id).await?;
    permit(&caller, Action::EditCart, Resource::OwnedBy(owner))?;

    uow.cart_items().delete(cart_item_id).await?;
    uow.carts()
        .adjust_total(item.cart_id, -item.price.times(item.quantity)?)
        .await?;

    uow.commit().await?;
    info!("Removed cart item {cart_item_id}");

    Ok("Cart item removed.")
}

pub async fn clear_cart_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::EditCart, Resource::OwnedBy(Some(caller.id)))?;

    let mut uow = state.store.begin().await?;

    let cart = uow
        .carts()
        .find_by_user(caller.id)
        .await?
        .ok_or(AppError::NotFound("Cart not found."))?;

    let removed = uow.cart_items().clear(cart.cart_id).await?;
    uow.carts().set_total(cart.cart_id, Money::ZERO).await?;

    uow.commit().await?;
    info!("Cleared {removed} items from cart {}", cart.cart_id);

    Ok("Cart cleared.")
}
