//! Typed client for the laptop catalog service.

use std::time::Duration;

use tracing::{debug, info};

use crate::catalog_proto::{
    CreateLaptopRequest, CreateLaptopResponse, Filter, Laptop, SearchLaptopRequest,
    SearchLaptopResponse,
};
use crate::laptop::LaptopId;
use crate::rpc::{GrpcPath, RpcClientConfig, RpcError, RpcSession, RpcStream};

pub const CREATE_LAPTOP_PATH: &str = "pcbook.LaptopService/CreateLaptop";
pub const SEARCH_LAPTOP_PATH: &str = "pcbook.LaptopService/SearchLaptop";

/// Result of a create call that did not fail fatally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The laptop was stored under the returned id.
    Created(LaptopId),
    /// A laptop with the same id was already stored. Nothing changed.
    AlreadyExists,
}

/// Client for `pcbook.LaptopService`, built on an [`RpcSession`].
#[derive(Debug, Clone)]
pub struct LaptopClient {
    session: RpcSession,
    create_path: GrpcPath,
    search_path: GrpcPath,
    create_timeout: Duration,
    search_timeout: Duration,
}

impl LaptopClient {
    /// Dial the endpoint in `config` and use its timeouts for every call.
    pub async fn connect(config: &RpcClientConfig) -> Result<Self, RpcError> {
        let session = RpcSession::connect(config).await?;
        Ok(Self::new(session, config))
    }

    pub fn new(session: RpcSession, config: &RpcClientConfig) -> Self {
        Self {
            session,
            create_path: GrpcPath::from_static(CREATE_LAPTOP_PATH),
            search_path: GrpcPath::from_static(SEARCH_LAPTOP_PATH),
            create_timeout: config.create_timeout,
            search_timeout: config.search_timeout,
        }
    }

    pub fn session(&self) -> &RpcSession {
        &self.session
    }

    /// Create `laptop` in the remote catalog.
    ///
    /// Send the laptop with an empty id to have the server assign one. A conflict on an existing
    /// id is reported as [`CreateOutcome::AlreadyExists`]; every other failure is an error.
    pub async fn create_laptop(&self, laptop: Laptop) -> Result<CreateOutcome, RpcError> {
        let request = CreateLaptopRequest {
            laptop: Some(laptop),
        };

        let result: Result<CreateLaptopResponse, RpcError> = self
            .session
            .unary(&self.create_path, request, self.create_timeout)
            .await;

        match result {
            Ok(response) if response.id.is_empty() => Err(RpcError::MalformedResponse {
                operation: self.create_path.to_string(),
                reason: "server returned an empty laptop id".to_string(),
            }),
            Ok(response) => {
                let id = LaptopId::from(response.id);
                debug!(id = %id, "Laptop created");
                Ok(CreateOutcome::Created(id))
            }
            Err(RpcError::AlreadyExists { message, .. }) => {
                debug!(message = %message, "Laptop already exists");
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }

    /// Search the catalog. The returned stream is bounded by the search timeout as a whole.
    pub async fn search_laptop(
        &self,
        filter: Filter,
    ) -> Result<RpcStream<SearchLaptopResponse>, RpcError> {
        info!(filter = ?filter, "Searching laptops");

        let request = SearchLaptopRequest {
            filter: Some(filter),
        };
        self.session
            .open_stream(&self.search_path, request, self.search_timeout)
            .await
    }
}
