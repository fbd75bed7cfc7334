//! Client side of the RPC layer.
//!
//! An [`RpcSession`] owns one connection to a remote endpoint and issues calls of two shapes
//! over it:
//!
//! - [`RpcSession::unary`]: one request, one response.
//! - [`RpcSession::open_stream`]: one request, a finite [`RpcStream`] of responses.
//!
//! Every call carries its own deadline. Sessions are cheap to clone and safe to share across
//! tasks.
//!
//! ```ignore
//! let config = RpcClientConfig::builder().endpoint("0.0.0.0:8080").build();
//! let session = RpcSession::connect(&config).await?;
//!
//! let path = GrpcPath::parse("pcbook.LaptopService/SearchLaptop")?;
//! let mut stream: RpcStream<SearchLaptopResponse> = session
//!     .open_stream(&path, request, config.search_timeout)
//!     .await?;
//!
//! while let Some(response) = stream.next().await? {
//!     println!("{response:?}");
//! }
//! ```

mod config;
mod session;
mod stream;

pub use config::{DEFAULT_CALL_TIMEOUT, RpcClientConfig};
pub use session::RpcSession;
pub use stream::RpcStream;
