pub mod http_transport;
pub mod stats;
pub mod traits;

pub use http_transport::HttpTransport;
pub use stats::TransportSnapshot;
pub use traits::{PortalResponse, Transport};
