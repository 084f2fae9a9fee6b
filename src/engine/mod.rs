pub mod dispatch;

#[derive(Debug, Clone, Copy)]
pub struct DispatchPolicy {
    pub search_radius_m: f64,
    pub max_claim_attempts: u32,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            search_radius_m: 5_000.0,
            max_claim_attempts: 3,
        }
    }
}
