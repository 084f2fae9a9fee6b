use crate::engine::DispatchPolicy;
use crate::observability::metrics::Metrics;
use crate::store::clients::ClientDirectory;
use crate::store::couriers::CourierRegistry;
use crate::store::orders::OrderLedger;

pub struct AppState {
    pub clients: ClientDirectory,
    pub couriers: CourierRegistry,
    pub orders: OrderLedger,
    pub policy: DispatchPolicy,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(policy: DispatchPolicy) -> Self {
        Self {
            clients: ClientDirectory::new(),
            couriers: CourierRegistry::new(),
            orders: OrderLedger::new(),
            policy,
            metrics: Metrics::new(),
        }
    }
}
