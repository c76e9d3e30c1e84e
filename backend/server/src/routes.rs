//! HTTP handlers, one module per resource.
//!
//! Every handler follows the same shape: authorize through [`crate::policy`],
//! validate the body, do its work in one [`store::UnitOfWork`], commit, respond.
pub mod auth;
pub mod cart;
pub mod menu_items;
pub mod orders;
pub mod restaurants;
pub mod users;
