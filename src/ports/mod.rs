#[allow(unused_imports)]
pub mod backend_gateway;

#[allow(unused_imports)]
pub use backend_gateway::*;
