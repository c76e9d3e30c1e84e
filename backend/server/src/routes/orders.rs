//! Order handlers.
//!
//! Line prices are snapshots supplied by the caller, but the order total must
//! equal the sum of its lines and every line must come from the ordered restaurant.
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use store::{NewLine, NewOrder};
use tracing::info;

use crate::{
    auth::Caller,
    error::AppError,
    payloads::{OrderPayload, OrderStatusPayload},
    policy::{Action, Resource, permit},
    state::AppState,
    utils::{ValidatedJson, check_total, non_empty},
};

pub async fn place_order_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    payload: Result<ValidatedJson<OrderPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::PlaceOrder, Resource::Any)?;
    let ValidatedJson(payload) = payload?;

    let lines: Vec<NewLine> = payload.order_items.iter().map(|item| item.line()).collect();
    check_total(payload.total_amount, &lines)?;

    let mut uow = state.store.begin().await?;

    if uow.restaurants().find(payload.restaurant_id).await?.is_none() {
        return Err(AppError::NotFound("Restaurant not found."));
    }

    for line in &lines {
        let item = uow
            .menu_items()
            .find(line.menu_item_id)
            .await?
            .ok_or(AppError::NotFound("Menu item not found."))?;

        if item.restaurant_id != payload.restaurant_id {
            return Err(AppError::BadRequest(format!(
                "Menu item {} does not belong to restaurant {}.",
                item.menu_item_id, payload.restaurant_id
            )));
        }
    }

    let order = uow
        .orders()
        .create(NewOrder {
            user_id: caller.id,
            restaurant_id: payload.restaurant_id,
            order_date: payload.order_date,
            total_amount: payload.total_amount,
            order_status: payload.order_status,
        })
        .await?;

    for line in lines {
        uow.order_items().add(order.order_id, line).await?;
    }

    let details = uow
        .orders()
        .find_details(order.order_id)
        .await?
        .ok_or(AppError::NotFound("Order not found."))?;

    uow.commit().await?;
    info!(
        "User {} placed order {} with {} items",
        caller.id,
        order.order_id,
        details.order_items.len()
    );

    Ok((StatusCode::CREATED, Json(details)))
}

pub async fn order_history_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ViewOrderHistory, Resource::Any)?;

    let mut uow = state.store.begin().await?;
    let orders = uow.orders().list_details_by_user(caller.id).await?;

    Ok(Json(non_empty(orders, "No orders found for this user.")?))
}

pub async fn get_order_handler(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    let mut uow = state.store.begin().await?;

    let order = uow
        .orders()
        .find_details(order_id)
        .await?
        .ok_or(AppError::NotFound("Order not found."))?;
    permit(&caller, Action::ViewOrder, Resource::OwnedBy(Some(order.order.user_id)))?;

    Ok(Json(order))
}

pub async fn update_order_status_handler(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
    caller: Caller,
    payload: Result<ValidatedJson<OrderStatusPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ManageOrders, Resource::Any)?;
    let ValidatedJson(payload) = payload?;

    let mut uow = state.store.begin().await?;

    let order = uow
        .orders()
        .set_status(order_id, payload.order_status)
        .await?
        .ok_or(AppError::NotFound("Order not found."))?;

    uow.commit().await?;
    info!("Order {order_id} is now {}", order.order_status);

    Ok(Json(order))
}

pub async fn delete_order_handler(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ManageOrders, Resource::Any)?;

    let mut uow = state.store.begin().await?;

    if !uow.orders().delete(order_id).await? {
        return Err(AppError::NotFound("Order not found."));
    }

    uow.commit().await?;
    info!("Deleted order {order_id}");

    Ok("Order deleted successfully.")
}

pub async fn user_orders_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    permit(&caller, Action::ManageOrders, Resource::Any)?;

    let mut uow = state.store.begin().await?;
    let orders = uow.orders().list_details_by_user(user_id).await?;

    Ok(Json(non_empty(orders, "No orders found for this user.")?))
}

pub async fn restaurant_orders_handler(
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
    permit(&caller, Action::ListRestaurantOrders, Resource::OwnedBy(owner))?;

    let orders = uow.orders().list_details_by_restaurant(restaurant_id).await?;

    Ok(Json(non_empty(orders, "No orders found for this restaurant.")?))
}
