use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use store::{Money, NewLine};
use tracing::debug;
use validator::Validate;

use crate::error::AppError;

/// JSON body that has passed its `validator` constraints.
///
/// A missing, null or unparsable body is [`AppError::MalformedPayload`], a
/// body breaking a constraint is [`AppError::InvalidPayload`].
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| {
                debug!("Rejected body: {e}");
                AppError::MalformedPayload
            })?;

        value.validate()?;

        Ok(Self(value))
    }
}

/// Empty collections are reported as missing, never as an empty list.
pub fn non_empty<T>(items: Vec<T>, message: &'static str) -> Result<Vec<T>, AppError> {
    if items.is_empty() {
        return Err(AppError::NotFound(message));
    }

    Ok(items)
}

/// Checks a caller supplied total against its lines.
pub fn check_total(total: Money, lines: &[NewLine]) -> Result<(), AppError> {
    let expected = Money::total(lines.iter().map(|line| (line.price, line.quantity)))?;

    if expected != total {
        return Err(AppError::BadRequest(format!(
            "Total amount {total} does not match the order items ({expected})."
        )));
    }

    Ok(())
}
