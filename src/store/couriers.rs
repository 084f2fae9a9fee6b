use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::{haversine_m, GeoPoint};
use crate::models::courier::{Courier, CourierStatus};

#[derive(Debug, Clone, Serialize)]
pub struct NearbyCourier {
    pub courier: Courier,
    pub distance_m: f64,
}

#[derive(Default)]
pub struct CourierRegistry {
    couriers: DashMap<Uuid, Courier>,
}

impl CourierRegistry {
    pub fn new() -> Self {
        Self {
            couriers: DashMap::new(),
        }
    }

    pub fn register(
        &self,
        name: String,
        location: Option<GeoPoint>,
        rating: f64,
    ) -> Result<Courier, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("name cannot be empty".to_string()));
        }

        let courier = Courier {
            id: Uuid::new_v4(),
            name,
            status: CourierStatus::Available,
            location,
            rating: rating.clamp(0.0, 5.0),
            updated_at: Utc::now(),
        };

        self.couriers.insert(courier.id, courier.clone());
        Ok(courier)
    }

    pub fn get(&self, id: Uuid) -> Result<Courier, AppError> {
        self.couriers
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("courier {id} not found")))
    }

    pub fn list(&self) -> Vec<Courier> {
        self.couriers
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.couriers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.couriers.is_empty()
    }

    pub fn update_location(&self, id: Uuid, location: GeoPoint) -> Result<Courier, AppError> {
        let mut courier = self
            .couriers
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("courier {id} not found")))?;

        courier.location = Some(location);
        courier.updated_at = Utc::now();

        Ok(courier.clone())
    }

    // Leaving BUSY is reserved for the dispatcher's release path; everything
    // else is a courier-driven change.
    pub fn update_status(&self, id: Uuid, status: CourierStatus) -> Result<Courier, AppError> {
        let mut courier = self
            .couriers
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("courier {id} not found")))?;

        if courier.status == CourierStatus::Busy && status != CourierStatus::Busy {
            return Err(AppError::Conflict(format!(
                "courier {id} is busy on an active order"
            )));
        }

        courier.status = status;
        courier.updated_at = Utc::now();

        Ok(courier.clone())
    }

    pub fn query_nearby(&self, origin: &GeoPoint, radius_m: f64) -> Vec<NearbyCourier> {
        let mut hits: Vec<NearbyCourier> = self
            .couriers
            .iter()
            .filter_map(|entry| {
                let courier = entry.value();
                if courier.status != CourierStatus::Available {
                    return None;
                }
                let location = courier.location.as_ref()?;
                let distance_m = haversine_m(location, origin);
                if distance_m > radius_m {
                    return None;
                }
                Some(NearbyCourier {
                    courier: courier.clone(),
                    distance_m,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then_with(|| a.courier.id.cmp(&b.courier.id))
        });

        hits
    }

    // Conditional write: succeeds only if the courier is still AVAILABLE at
    // commit time. A false return means the race was lost.
    pub(crate) fn try_claim(&self, id: Uuid) -> bool {
        match self.couriers.get_mut(&id) {
            Some(mut courier) if courier.status == CourierStatus::Available => {
                courier.status = CourierStatus::Busy;
                courier.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn release(&self, id: Uuid) -> Result<(), AppError> {
        let mut courier = self
            .couriers
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("courier {id} not found")))?;

        if courier.status == CourierStatus::Busy {
            courier.status = CourierStatus::Available;
            courier.updated_at = Utc::now();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CourierRegistry;
    use crate::geo::GeoPoint;
    use crate::models::courier::CourierStatus;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    fn registry_with_couriers() -> (CourierRegistry, GeoPoint) {
        let registry = CourierRegistry::new();
        let origin = point(52.370, 4.900);

        registry
            .register("near".to_string(), Some(point(52.371, 4.901)), 4.5)
            .unwrap();
        registry
            .register("far".to_string(), Some(point(52.420, 4.950)), 4.9)
            .unwrap();
        registry
            .register("another-city".to_string(), Some(point(48.8566, 2.3522)), 5.0)
            .unwrap();

        (registry, origin)
    }

    #[test]
    fn register_clamps_rating() {
        let registry = CourierRegistry::new();
        let courier = registry.register("Max".to_string(), None, 9.9).unwrap();
        assert_eq!(courier.rating, 5.0);
        assert_eq!(courier.status, CourierStatus::Available);
    }

    #[test]
    fn query_nearby_orders_by_ascending_distance() {
        let (registry, origin) = registry_with_couriers();

        let hits = registry.query_nearby(&origin, 50_000.0);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].courier.name, "near");
        assert_eq!(hits[1].courier.name, "far");
        assert!(hits[0].distance_m <= hits[1].distance_m);
    }

    #[test]
    fn query_nearby_never_returns_unavailable_couriers() {
        let (registry, origin) = registry_with_couriers();

        for courier in registry.list() {
            if courier.name == "near" {
                registry
                    .update_status(courier.id, CourierStatus::Offline)
                    .unwrap();
            }
        }

        let hits = registry.query_nearby(&origin, 50_000.0);
        assert!(hits.iter().all(|hit| hit.courier.name != "near"));
        assert!(hits
            .iter()
            .all(|hit| hit.courier.status == CourierStatus::Available));
    }

    #[test]
    fn query_nearby_skips_couriers_without_location() {
        let registry = CourierRegistry::new();
        registry.register("ghost".to_string(), None, 4.0).unwrap();

        let hits = registry.query_nearby(&point(52.370, 4.900), 50_000.0);
        assert!(hits.is_empty());
    }

    #[test]
    fn smaller_radius_yields_subset_of_larger_radius() {
        let (registry, origin) = registry_with_couriers();

        let small = registry.query_nearby(&origin, 1_000.0);
        let large = registry.query_nearby(&origin, 50_000.0);

        assert!(small.len() <= large.len());
        for hit in &small {
            assert!(large
                .iter()
                .any(|other| other.courier.id == hit.courier.id));
        }
    }

    #[test]
    fn distance_ties_break_by_courier_id() {
        let registry = CourierRegistry::new();
        let shared = point(52.371, 4.901);
        registry
            .register("twin-a".to_string(), Some(shared), 4.0)
            .unwrap();
        registry
            .register("twin-b".to_string(), Some(shared), 4.0)
            .unwrap();

        let hits = registry.query_nearby(&point(52.370, 4.900), 5_000.0);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].courier.id < hits[1].courier.id);
    }

    #[test]
    fn try_claim_succeeds_at_most_once() {
        let registry = CourierRegistry::new();
        let courier = registry
            .register("solo".to_string(), Some(point(52.37, 4.9)), 4.0)
            .unwrap();

        assert!(registry.try_claim(courier.id));
        assert!(!registry.try_claim(courier.id));
        assert_eq!(registry.get(courier.id).unwrap().status, CourierStatus::Busy);
    }

    #[test]
    fn update_status_cannot_release_a_busy_courier() {
        let registry = CourierRegistry::new();
        let courier = registry
            .register("busy".to_string(), Some(point(52.37, 4.9)), 4.0)
            .unwrap();
        assert!(registry.try_claim(courier.id));

        assert!(registry
            .update_status(courier.id, CourierStatus::Available)
            .is_err());
        assert!(registry
            .update_status(courier.id, CourierStatus::Offline)
            .is_err());
        assert_eq!(registry.get(courier.id).unwrap().status, CourierStatus::Busy);
    }

    #[test]
    fn update_location_never_touches_status() {
        let registry = CourierRegistry::new();
        let courier = registry
            .register("moving".to_string(), Some(point(52.37, 4.9)), 4.0)
            .unwrap();
        assert!(registry.try_claim(courier.id));

        let updated = registry
            .update_location(courier.id, point(52.38, 4.91))
            .unwrap();
        assert_eq!(updated.status, CourierStatus::Busy);
        assert_eq!(updated.location.unwrap(), point(52.38, 4.91));
    }

    #[test]
    fn release_is_idempotent() {
        let registry = CourierRegistry::new();
        let courier = registry
            .register("done".to_string(), Some(point(52.37, 4.9)), 4.0)
            .unwrap();
        assert!(registry.try_claim(courier.id));

        registry.release(courier.id).unwrap();
        registry.release(courier.id).unwrap();
        assert_eq!(
            registry.get(courier.id).unwrap().status,
            CourierStatus::Available
        );
    }
}
