use std::time::Duration;

/// Tunables for the registration core, supplied by the embedding application.
#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    /// Prefix of every receipt number, e.g. `VEYG-42`.
    pub receipt_prefix: String,
    /// Upper bound for a single store round-trip.
    pub store_timeout: Duration,
    /// Random disambiguators tried for a colliding id before the timestamp fallback.
    pub collision_attempts: u8,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            receipt_prefix: "VEYG".to_string(),
            store_timeout: Duration::from_secs(5),
            collision_attempts: 5,
        }
    }
}
