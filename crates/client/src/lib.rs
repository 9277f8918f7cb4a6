pub mod client;
pub mod extract;
pub mod headers;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod negotiator;
pub mod relay;
pub mod request_id;
pub mod startup;
pub mod transport;

pub use client::build_http_client;
pub use headers::Headers;
pub use negotiator::SessionNegotiator;
pub use relay::RelayForwarder;
pub use request_id::{RequestIdGenerator, UuidRequestIds};
pub use startup::StartupFetcher;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
