use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog_proto::laptop_service_server::{LaptopService, LaptopServiceServer};
use crate::catalog_proto::{
    CreateLaptopRequest, CreateLaptopResponse, Laptop, SearchLaptopRequest, SearchLaptopResponse,
};
use crate::laptop::LaptopId;
use crate::store::LaptopStore;

/// How the server picks an id for laptops created without one.
#[derive(Debug, Default)]
pub enum IdAssigner {
    /// A random UUID v4 per laptop.
    #[default]
    Uuid,
    /// Decimal ids counting up from 1.
    Sequential(AtomicU64),
}

impl IdAssigner {
    pub fn sequential() -> Self {
        IdAssigner::Sequential(AtomicU64::new(1))
    }

    fn next_id(&self) -> LaptopId {
        match self {
            IdAssigner::Uuid => LaptopId::from(Uuid::new_v4().to_string()),
            IdAssigner::Sequential(next) => {
                LaptopId::from(next.fetch_add(1, Ordering::Relaxed).to_string())
            }
        }
    }
}

/// Listen on `addr` and serve the catalog backed by `store` until the server fails.
pub async fn start_server(
    addr: SocketAddr,
    store: Arc<LaptopStore>,
    ids: IdAssigner,
) -> anyhow::Result<()> {
    let service = LaptopServiceImpl::new(store, ids);

    info!(address = %addr, "gRPC server starting");

    tonic::transport::Server::builder()
        .add_service(LaptopServiceServer::new(service))
        .serve(addr)
        .await?;

    Ok(())
}

/// Serve the catalog on an already bound listener.
pub async fn serve_with_listener(
    listener: TcpListener,
    service: LaptopServiceImpl,
) -> Result<(), tonic::transport::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, "gRPC server starting");
    }

    tonic::transport::Server::builder()
        .add_service(LaptopServiceServer::new(service))
        .serve_with_incoming(TcpListenerStream::new(listener))
        .await
}

pub struct LaptopServiceImpl {
    store: Arc<LaptopStore>,
    ids: IdAssigner,
}

impl LaptopServiceImpl {
    pub fn new(store: Arc<LaptopStore>, ids: IdAssigner) -> Self {
        Self { store, ids }
    }

    /// Draw ids until one is free. Only client-chosen ids can conflict.
    fn save_with_assigned_id(&self, mut laptop: Laptop) -> LaptopId {
        loop {
            laptop.id = self.ids.next_id().into();
            match self.store.save(laptop.clone()) {
                Ok(id) => return id,
                Err(taken) => debug!(id = %taken.laptop_id, "Assigned id already taken"),
            }
        }
    }
}

#[tonic::async_trait]
impl LaptopService for LaptopServiceImpl {
    type SearchLaptopStream =
        Pin<Box<dyn futures::Stream<Item = Result<SearchLaptopResponse, Status>> + Send>>;

    async fn create_laptop(
        &self,
        request: Request<CreateLaptopRequest>,
    ) -> Result<Response<CreateLaptopResponse>, Status> {
        let laptop = request
            .into_inner()
            .laptop
            .ok_or_else(|| Status::invalid_argument("Request carries no laptop"))?;

        debug!(id = %laptop.id, brand = %laptop.brand, "Received create request");

        let saved = if laptop.id.is_empty() {
            Ok(self.save_with_assigned_id(laptop))
        } else {
            self.store.save(laptop)
        };

        match saved {
            Ok(id) => {
                info!(id = %id, "Laptop saved");
                Ok(Response::new(CreateLaptopResponse { id: id.into() }))
            }
            Err(e) => {
                warn!(error = %e, "Rejecting duplicate laptop");
                Err(Status::already_exists(e.to_string()))
            }
        }
    }

    async fn search_laptop(
        &self,
        request: Request<SearchLaptopRequest>,
    ) -> Result<Response<Self::SearchLaptopStream>, Status> {
        let filter = request.into_inner().filter.unwrap_or_default();
        let found = self.store.search(&filter);

        info!(filter = ?filter, matches = found.len(), "Search started");

        let outbound = async_stream::stream! {
            for laptop in found {
                debug!(id = %laptop.id, "Sending match");
                yield Ok(SearchLaptopResponse {
                    laptop: Some(laptop),
                });
            }
        };

        Ok(Response::new(Box::pin(outbound)))
    }
}
