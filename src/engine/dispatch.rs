use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};
use crate::state::AppState;

pub fn assign(state: &AppState, order_id: Uuid) -> Result<Order, AppError> {
    let started = Instant::now();
    let result = assign_inner(state, order_id);

    let outcome = match &result {
        Ok(_) => "success",
        Err(AppError::NoCourierAvailable) => "no_courier",
        Err(AppError::ConflictRetryExhausted) => "conflict",
        Err(_) => "error",
    };
    let elapsed = started.elapsed().as_secs_f64();
    state
        .metrics
        .assignment_latency_seconds
        .with_label_values(&[outcome])
        .observe(elapsed);
    state
        .metrics
        .assignments_total
        .with_label_values(&[outcome])
        .inc();

    result
}

fn assign_inner(state: &AppState, order_id: Uuid) -> Result<Order, AppError> {
    let order = state.orders.get(order_id)?;
    if order.status != OrderStatus::Created {
        return Err(AppError::InvalidTransition {
            from: order.status,
            to: OrderStatus::Assigned,
        });
    }
    order.delivery_location.validate()?;

    let candidates = state
        .couriers
        .query_nearby(&order.delivery_location, state.policy.search_radius_m);
    if candidates.is_empty() {
        warn!(order_id = %order_id, "no couriers available within search radius");
        return Err(AppError::NoCourierAvailable);
    }

    let mut claim_losses = 0;
    for candidate in candidates {
        if claim_losses >= state.policy.max_claim_attempts {
            warn!(order_id = %order_id, losses = claim_losses, "claim retries exhausted");
            return Err(AppError::ConflictRetryExhausted);
        }

        let courier_id = candidate.courier.id;
        if !state.couriers.try_claim(courier_id) {
            // lost the race for this courier, move to the next candidate
            claim_losses += 1;
            continue;
        }

        match state.orders.try_assign(order_id, courier_id) {
            Ok(assigned) => {
                info!(
                    order_id = %order_id,
                    courier_id = %courier_id,
                    distance_m = candidate.distance_m,
                    "order assigned"
                );
                return Ok(assigned);
            }
            Err(err) => {
                // the order side raced (canceled or assigned elsewhere);
                // the claim must not outlive the failed pairing
                state.couriers.release(courier_id)?;
                return Err(err);
            }
        }
    }

    warn!(order_id = %order_id, "every nearby courier was claimed by a concurrent assignment");
    Err(AppError::NoCourierAvailable)
}

pub fn release(state: &AppState, order_id: Uuid) -> Result<(), AppError> {
    let order = state.orders.get(order_id)?;

    let Some(courier_id) = order.courier_id else {
        return Ok(());
    };

    release_courier(state, order_id, courier_id)
}

pub fn transition_order(
    state: &AppState,
    order_id: Uuid,
    next: OrderStatus,
) -> Result<Order, AppError> {
    if next == OrderStatus::Assigned {
        return Err(AppError::BadRequest(
            "orders are assigned through the dispatch endpoint".to_string(),
        ));
    }

    let outcome = state.orders.transition(order_id, next)?;
    if let Some(courier_id) = outcome.released_courier {
        release_courier(state, order_id, courier_id)?;
    }

    info!(order_id = %order_id, status = ?next, "order transitioned");
    Ok(outcome.order)
}

fn release_courier(state: &AppState, order_id: Uuid, courier_id: Uuid) -> Result<(), AppError> {
    state.couriers.release(courier_id)?;
    state.metrics.releases_total.inc();
    info!(order_id = %order_id, courier_id = %courier_id, "courier released");
    Ok(())
}
