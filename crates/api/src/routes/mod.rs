//! API route definitions.

use axum::Router;
use serde::{Deserialize, Deserializer};
use splitledger_shared::AppError;

use crate::AppState;

pub mod balances;
pub mod expenses;
pub mod groups;
pub mod health;
pub mod members;
pub mod receipts;
pub mod users;

/// Creates the API router with all routes.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(groups::routes())
        .merge(members::routes())
        .merge(expenses::routes())
        .merge(balances::routes())
        .merge(receipts::routes(state))
}

/// Trims `value` and checks it holds 1..=`max` characters.
pub(crate) fn trimmed(value: &str, field: &str, max: usize) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
