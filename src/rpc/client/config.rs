use std::time::Duration;

use bon::Builder;

/// Default per-call timeout for both catalog operations.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for an [`RpcSession`](super::RpcSession).
#[derive(Debug, Clone, Builder)]
pub struct RpcClientConfig {
    /// Address of the remote service, either a full URI (`http://host:port`) or a bare
    /// `host:port`, which is dialed over plaintext HTTP/2.
    #[builder(into)]
    pub endpoint: String,

    /// Upper bound on establishing the underlying connection.
    #[builder(default = Duration::from_secs(5))]
    pub connect_timeout: Duration,

    /// Timeout applied to each create call.
    #[builder(default = DEFAULT_CALL_TIMEOUT)]
    pub create_timeout: Duration,

    /// Timeout covering the whole lifetime of a search stream.
    #[builder(default = DEFAULT_CALL_TIMEOUT)]
    pub search_timeout: Duration,

    /// Defer connecting until the first call instead of dialing on construction.
    #[builder(default)]
    pub lazy: bool,
}

impl RpcClientConfig {
    /// The endpoint as a URI with a scheme.
    pub(crate) fn endpoint_uri(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else {
            format!("http://{}", self.endpoint)
        }
    }
}
