/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Party lifecycle operations behind the REST API.
pub mod party_service;
/// Proxy health polling and degraded mode.
pub mod proxy_supervisor;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
