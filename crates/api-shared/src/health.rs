use crate::pb::HealthRes;

/// Simple health service that can be used by both gRPC and REST APIs
///
/// A process only starts serving after the knowledge base and model have loaded, so being able
/// to answer at all means the service is healthy.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "medrec is alive".into(),
        }
    }
}
