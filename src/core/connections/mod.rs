pub mod connection_validator;
pub mod manager;
pub mod port_validator;

pub use connection_validator::{ConnectionValidator, EndpointInfo, WireKind};
pub use manager::{ConnectionManager, ConnectionStats, WireSource};
pub use port_validator::PortValidator;
