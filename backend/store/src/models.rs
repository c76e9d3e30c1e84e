use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::money::Money;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Role {
    Admin,
    User,
    Customer,
    Restaurant,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::User, Role::Customer, Role::Restaurant];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
            Role::Customer => "Customer",
            Role::Restaurant => "Restaurant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("Unknown role: {s}"))
    }
}

#[derive(Clone, Debug, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub role: Role,
}

#[derive(Clone, Debug, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub restaurant_id: i64,
    pub name: String,
    pub location: String,
    pub contact_number: Option<String>,
    pub owner_user_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub menu_item_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Money,
    pub availability: bool,
    pub special_dietary_info: Option<String>,
    pub taste_info: Option<String>,
    pub nutritional_info: Option<String>,
    pub restaurant_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub cart_id: i64,
    pub user_id: i64,
    pub total_price: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub cart_item_id: i64,
    pub cart_id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    pub price: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: i64,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub order_date: DateTime<Utc>,
    pub total_amount: Money,
    pub order_status: String,
}

#[derive(Clone, Debug, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub order_item_id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    pub price: Money,
}

/// A cart line with the menu item it points at.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub menu_item: MenuItem,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDetails {
    #[serde(flatten)]
    pub cart: Cart,
    pub cart_items: Vec<CartLine>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(flatten)]
    pub item: OrderItem,
    pub menu_item: MenuItem,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderLine>,
}

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub role: Role,
}

pub struct RestaurantFields {
    pub name: String,
    pub location: String,
    pub contact_number: Option<String>,
    pub owner_user_id: Option<i64>,
}

pub struct MenuItemFields {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Money,
    pub availability: bool,
    pub special_dietary_info: Option<String>,
    pub taste_info: Option<String>,
    pub nutritional_info: Option<String>,
    pub restaurant_id: i64,
}

pub struct NewOrder {
    pub user_id: i64,
    pub restaurant_id: i64,
    pub order_date: DateTime<Utc>,
    pub total_amount: Money,
    pub order_status: String,
}

/// Snapshot of a menu item at the time it was put in a cart or order.
#[derive(Clone, Copy, Debug)]
pub struct NewLine {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub price: Money,
}

/// Partial profile update, `None` keeps the stored value.
#[derive(Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_number: Option<String>,
}
