//! Lease manager, broker registry, replication engine, HWM service, role
//! controller, and peer HTTP client.

mod error;
pub mod hwm;
pub mod lease;
pub mod peer;
pub mod registry;
pub mod replication;
pub mod role;

pub use error::{Error, Result};
pub use hwm::HwmService;
pub use lease::LeaseManager;
pub use peer::PeerClient;
pub use registry::{BrokerRegistry, PeerAddr};
pub use replication::{LocalLog, ReplicationEngine};
pub use role::{Role, RoleController};
