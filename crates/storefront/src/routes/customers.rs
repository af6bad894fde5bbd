//! Guest customer registration.

use axum::{Json, extract::State, http::StatusCode};

use delivery_core::customer::{Customer, CustomerProfileInput};

use crate::error::Result;
use crate::state::AppState;

/// Register a customer without a password (checkout sign-up).
///
/// POST /api/customers
///
/// Email and phone must be unused; a duplicate answers `409`.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CustomerProfileInput>,
) -> Result<(StatusCode, Json<Customer>)> {
    let profile = body.validate()?;
    let customer = state.stores().customers.create(profile, None).await?;

    tracing::info!(customer_id = %customer.id, "Customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}
