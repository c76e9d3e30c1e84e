//! # Policy
//!
//! Every handler asks [`authorize`] before touching data.
//!
//! An [`Action`] has a set of roles allowed to attempt it. Owner scoped actions
//! additionally need the caller to own the [`Resource`], Admin owns everything.
//!
//! | Action | Roles | Owner scoped |
//! |---|---|---|
//! | ViewCart, EditCart | User, Admin | cart owner |
//! | ListMenuItems, ViewMenuItem | Admin, Restaurant | restaurant owner |
//! | ManageMenuItems, ManageOrders, ManageRestaurants, ManageUsers | Admin | |
//! | PlaceOrder, ViewProfile | all | |
//! | ViewOrderHistory, ViewOwnOrders | Customer, Admin | |
//! | ViewOrder, UpdateProfile | all | order or profile owner |
//! | ListRestaurantOrders, ViewRestaurant | Admin, Restaurant | restaurant owner |
//! | ListRestaurants, ViewOwnRestaurant | Admin, Restaurant | |
use store::Role;
use tracing::warn;

use crate::{auth::Caller, error::AppError};

const ALL: &[Role] = &Role::ALL;
const ADMIN: &[Role] = &[Role::Admin];
const SHOPPERS: &[Role] = &[Role::User, Role::Admin];
const CUSTOMERS: &[Role] = &[Role::Customer, Role::Admin];
const RESTAURATEURS: &[Role] = &[Role::Restaurant, Role::Admin];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    ViewCart,
    EditCart,
    ListMenuItems,
    ViewMenuItem,
    ManageMenuItems,
    PlaceOrder,
    ViewOrderHistory,
    ViewOrder,
    ManageOrders,
    ListRestaurantOrders,
    ListRestaurants,
    ViewRestaurant,
    ManageRestaurants,
    ManageUsers,
    ViewProfile,
    UpdateProfile,
    ViewOwnOrders,
    ViewOwnRestaurant,
}

impl Action {
    fn rule(self) -> (&'static [Role], bool) {
        match self {
            Action::ViewCart | Action::EditCart => (SHOPPERS, true),
            Action::ListMenuItems | Action::ViewMenuItem => (RESTAURATEURS, true),
            Action::ManageMenuItems
            | Action::ManageOrders
            | Action::ManageRestaurants
            | Action::ManageUsers => (ADMIN, false),
            Action::PlaceOrder | Action::ViewProfile => (ALL, false),
            Action::ViewOrderHistory | Action::ViewOwnOrders => (CUSTOMERS, false),
            Action::ViewOrder | Action::UpdateProfile => (ALL, true),
            Action::ListRestaurantOrders | Action::ViewRestaurant => (RESTAURATEURS, true),
            Action::ListRestaurants | Action::ViewOwnRestaurant => (RESTAURATEURS, false),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Any,
    /// User id of the owner, `None` for unowned restaurants.
    OwnedBy(Option<i64>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

pub fn authorize(caller: &Caller, action: Action, resource: Resource) -> Decision {
    let (roles, owner_scoped) = action.rule();

    if !roles.contains(&caller.role) {
        return Decision::Deny;
    }

    if !owner_scoped || caller.role == Role::Admin {
        return Decision::Allow;
    }

    match resource {
        Resource::OwnedBy(Some(owner)) if owner == caller.id => Decision::Allow,
        _ => Decision::Deny,
    }
}

/// [`authorize`] as a handler guard.
pub fn permit(caller: &Caller, action: Action, resource: Resource) -> Result<(), AppError> {
    match authorize(caller, action, resource) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            warn!(
                "Denied {action:?} on {resource:?} for user {} ({})",
                caller.id, caller.role
            );
            Err(AppError::Unauthorized)
        }
    }
}
