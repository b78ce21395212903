mod api_server;

pub use api_server::{router, ApiServer, ApiState};

// Re-export for external use (e.g., integration tests)
pub use api_server::{CreateDomainRequest, ErrorResponse, HealthResponse};
