//! Request and response bodies.
//!
//! Requests are validated with `validator` before any handler logic runs,
//! see [`crate::utils::ValidatedJson`].
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use store::{Money, MenuItemFields, NewLine, ProfileChanges, Role, User};
use validator::{Validate, ValidationError};

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()\-]{7,20}$").expect("phone pattern compiles"));

fn phone(value: &str) -> Result<(), ValidationError> {
    if PHONE.is_match(value) {
        return Ok(());
    }

    Err(ValidationError::new("phone").with_message("Invalid phone number".into()))
}

fn non_negative(value: &Money) -> Result<(), ValidationError> {
    if value.is_negative() {
        return Err(ValidationError::new("range").with_message("Must not be negative".into()));
    }

    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email, length(max = 100))]
    pub email: String,

    #[validate(length(min = 6))]
    pub password: String,

    #[validate(length(max = 200))]
    pub address: Option<String>,

    #[validate(custom(function = "phone"))]
    pub contact_number: Option<String>,

    pub role: Role,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(email, length(max = 100))]
    pub email: String,

    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartItemPayload {
    pub menu_item_id: i64,

    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,

    #[validate(custom(function = "non_negative"))]
    pub price: Money,
}

impl CartItemPayload {
    pub fn line(&self) -> NewLine {
        NewLine {
            menu_item_id: self.menu_item_id,
            quantity: self.quantity,
            price: self.price,
        }
    }
}

/// Either a bare integer or `{"quantity": n}`.
#[derive(Debug, Deserialize, Validate)]
#[serde(from = "QuantityBody")]
pub struct QuantityPayload {
    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuantityBody {
    Bare(i32),
    Object { quantity: i32 },
}

impl From<QuantityBody> for QuantityPayload {
    fn from(body: QuantityBody) -> Self {
        match body {
            QuantityBody::Bare(quantity) | QuantityBody::Object { quantity } => Self { quantity },
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub category: String,

    #[validate(custom(function = "non_negative"))]
    pub price: Money,

    pub availability: bool,

    #[validate(length(max = 100))]
    pub special_dietary_info: Option<String>,

    #[validate(length(max = 100))]
    pub taste_info: Option<String>,

    #[validate(length(max = 100))]
    pub nutritional_info: Option<String>,

    pub restaurant_id: i64,
}

impl From<MenuItemPayload> for MenuItemFields {
    fn from(payload: MenuItemPayload) -> Self {
        Self {
            name: payload.name,
            description: payload.description,
            category: payload.category,
            price: payload.price,
            availability: payload.availability,
            special_dietary_info: payload.special_dietary_info,
            taste_info: payload.taste_info,
            nutritional_info: payload.nutritional_info,
            restaurant_id: payload.restaurant_id,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    pub menu_item_id: i64,

    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,

    #[validate(custom(function = "non_negative"))]
    pub price: Money,
}

impl OrderItemPayload {
    pub fn line(&self) -> NewLine {
        NewLine {
            menu_item_id: self.menu_item_id,
            quantity: self.quantity,
            price: self.price,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub restaurant_id: i64,

    pub order_date: DateTime<Utc>,

    #[validate(custom(function = "non_negative"))]
    pub total_amount: Money,

    #[validate(length(min = 1, max = 50))]
    pub order_status: String,

    #[validate(length(min = 1), nested)]
    pub order_items: Vec<OrderItemPayload>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusPayload {
    #[validate(length(min = 1, max = 50))]
    pub order_status: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 200))]
    pub location: String,

    #[validate(custom(function = "phone"))]
    pub contact_number: Option<String>,

    pub owner_user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdatePayload {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(email, length(max = 100))]
    pub email: Option<String>,

    #[validate(length(max = 200))]
    pub address: Option<String>,

    #[validate(custom(function = "phone"))]
    pub contact_number: Option<String>,
}

impl From<ProfileUpdatePayload> for ProfileChanges {
    fn from(payload: ProfileUpdatePayload) -> Self {
        Self {
            name: payload.name,
            email: payload.email,
            address: payload.address,
            contact_number: payload.contact_number,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// What other users may see of an account, no password or role.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            email: user.email,
            address: user.address,
            contact_number: user.contact_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn register(overrides: serde_json::Value) -> RegisterPayload {
        let mut body = json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "secret1",
            "role": "Customer",
        });

        if let (Some(body), Some(overrides)) = (body.as_object_mut(), overrides.as_object()) {
            body.extend(overrides.clone());
        }

        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_register_constraints() {
        assert!(register(json!({})).validate().is_ok());
        assert!(register(json!({ "contactNumber": "+1 (555) 010-9999" })).validate().is_ok());

        assert!(register(json!({ "name": "" })).validate().is_err());
        assert!(register(json!({ "email": "not-an-email" })).validate().is_err());
        assert!(register(json!({ "password": "short" })).validate().is_err());
        assert!(register(json!({ "address": "x".repeat(201) })).validate().is_err());
        assert!(register(json!({ "contactNumber": "call me" })).validate().is_err());
    }

    #[test]
    fn test_unknown_role_is_malformed() {
        let body = json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "secret1",
            "role": "Chef",
        });

        assert!(serde_json::from_value::<RegisterPayload>(body).is_err());
    }

    #[test]
    fn test_order_needs_valid_lines() {
        let mut body = json!({
            "restaurantId": 1,
            "orderDate": "2024-05-01T12:00:00Z",
            "totalAmount": "200.00",
            "orderStatus": "Pending",
            "orderItems": [{ "menuItemId": 1, "quantity": 2, "price": 100 }],
        });

        let order: OrderPayload = serde_json::from_value(body.clone()).unwrap();
        assert!(order.validate().is_ok());
        assert_eq!(order.order_items[0].line().price, Money::from_cents(10_000).unwrap());

        body["orderItems"] = json!([]);
        let empty: OrderPayload = serde_json::from_value(body.clone()).unwrap();
        assert!(empty.validate().is_err());

        body["orderItems"] = json!([{ "menuItemId": 1, "quantity": 0, "price": 100 }]);
        let zero: OrderPayload = serde_json::from_value(body).unwrap();
        let errors = zero.validate().unwrap_err();
        assert!(errors.errors().contains_key("order_items"));
    }

    #[test]
    fn test_quantity_accepts_bare_integer_or_object() {
        let bare: QuantityPayload = serde_json::from_value(json!(3)).unwrap();
        let object: QuantityPayload = serde_json::from_value(json!({ "quantity": 4 })).unwrap();

        assert_eq!(bare.quantity, 3);
        assert_eq!(object.quantity, 4);
        assert!(serde_json::from_value::<QuantityPayload>(json!(0)).unwrap().validate().is_err());
        assert!(serde_json::from_value::<QuantityPayload>(json!("3")).is_err());
        assert!(serde_json::from_value::<QuantityPayload>(json!({})).is_err());
    }

    #[test]
    fn test_negative_prices_are_invalid() {
        let item: CartItemPayload =
            serde_json::from_value(json!({ "menuItemId": 1, "quantity": 1, "price": -1 })).unwrap();

        assert!(item.validate().is_err());
    }

    #[test]
    fn test_profile_update_is_all_optional() {
        assert!(ProfileUpdatePayload::default().validate().is_ok());

        let update = ProfileUpdatePayload {
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
