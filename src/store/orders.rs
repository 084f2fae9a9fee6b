use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::GeoPoint;
use crate::models::order::{Order, OrderStatus};
use crate::store::clients::ClientDirectory;

pub struct NewOrder {
    pub client_id: Uuid,
    pub delivery_address: String,
    pub delivery_location: GeoPoint,
}

pub struct TransitionOutcome {
    pub order: Order,
    pub released_courier: Option<Uuid>,
}

#[derive(Default)]
pub struct OrderLedger {
    orders: DashMap<Uuid, Order>,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
        }
    }

    pub fn create(&self, new: NewOrder, clients: &ClientDirectory) -> Result<Order, AppError> {
        if !clients.contains(new.client_id) {
            return Err(AppError::NotFound(format!(
                "client {} not found",
                new.client_id
            )));
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            client_id: new.client_id,
            courier_id: None,
            status: OrderStatus::Created,
            delivery_address: new.delivery_address,
            delivery_location: new.delivery_location,
            created_at: now,
            updated_at: now,
        };

        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    pub fn get(&self, id: Uuid) -> Result<Order, AppError> {
        self.orders
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))
    }

    pub fn list(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    // Full-row replace; id and created_at stay with the row. A status change
    // smuggled through here must still be a legal state-machine edge.
    pub fn update(&self, order: Order) -> Result<Order, AppError> {
        let mut entry = self
            .orders
            .get_mut(&order.id)
            .ok_or_else(|| AppError::NotFound(format!("order {} not found", order.id)))?;

        if entry.status != order.status && !entry.status.can_transition_to(order.status) {
            return Err(AppError::InvalidTransition {
                from: entry.status,
                to: order.status,
            });
        }

        let courier_required = matches!(
            order.status,
            OrderStatus::Assigned | OrderStatus::InTransit | OrderStatus::Delivered
        );
        if courier_required != order.courier_id.is_some() {
            return Err(AppError::BadRequest(
                "courier reference must be set exactly for ASSIGNED, IN_TRANSIT and DELIVERED orders"
                    .to_string(),
            ));
        }

        entry.client_id = order.client_id;
        entry.courier_id = order.courier_id;
        entry.status = order.status;
        entry.delivery_address = order.delivery_address;
        entry.delivery_location = order.delivery_location;
        entry.updated_at = Utc::now();

        Ok(entry.clone())
    }

    pub fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.orders
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))
    }

    // Conditional write: commits only if the order is still CREATED.
    pub(crate) fn try_assign(&self, id: Uuid, courier_id: Uuid) -> Result<Order, AppError> {
        let mut entry = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        if entry.status != OrderStatus::Created {
            return Err(AppError::InvalidTransition {
                from: entry.status,
                to: OrderStatus::Assigned,
            });
        }

        entry.courier_id = Some(courier_id);
        entry.status = OrderStatus::Assigned;
        entry.updated_at = Utc::now();

        Ok(entry.clone())
    }

    pub(crate) fn transition(
        &self,
        id: Uuid,
        next: OrderStatus,
    ) -> Result<TransitionOutcome, AppError> {
        let mut entry = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        if !entry.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: entry.status,
                to: next,
            });
        }

        entry.status = next;
        entry.updated_at = Utc::now();

        // A canceled order must not retain a courier reference; a delivered
        // one keeps it for the record.
        let released_courier = match next {
            OrderStatus::Canceled => entry.courier_id.take(),
            OrderStatus::Delivered => entry.courier_id,
            _ => None,
        };

        Ok(TransitionOutcome {
            order: entry.clone(),
            released_courier,
        })
    }
}
