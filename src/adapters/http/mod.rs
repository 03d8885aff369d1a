pub mod backend_gateway;
pub mod wire;

#[allow(unused_imports)]
pub use backend_gateway::HttpBackendGateway;
