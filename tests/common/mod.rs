#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use pcbook_rpc::catalog_proto::laptop_service_server::{LaptopService, LaptopServiceServer};
use pcbook_rpc::catalog_proto::memory::Unit;
use pcbook_rpc::catalog_proto::{Cpu, Laptop, Memory};
use pcbook_rpc::grpc::{self, IdAssigner, LaptopServiceImpl};
use pcbook_rpc::rpc::RpcClientConfig;
use pcbook_rpc::store::LaptopStore;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;

/// A catalog server running on a random local port for the lifetime of the value.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<LaptopStore>,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    pub async fn start(ids: IdAssigner) -> Self {
        Self::with_store(Arc::new(LaptopStore::new()), ids).await
    }

    pub async fn with_store(store: Arc<LaptopStore>, ids: IdAssigner) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let service = LaptopServiceImpl::new(Arc::clone(&store), ids);

        let handle = tokio::spawn(async move {
            grpc::serve_with_listener(listener, service).await.unwrap();
        });

        Self {
            addr,
            store,
            handle,
        }
    }

    pub fn config(&self) -> RpcClientConfig {
        RpcClientConfig::builder()
            .endpoint(self.addr.to_string())
            .build()
    }
}

/// Serve an arbitrary `LaptopService` implementation, for misbehaving test doubles.
pub async fn serve_custom<S: LaptopService>(service: S) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(LaptopServiceServer::new(service))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    (addr, handle)
}

pub fn config_for(addr: SocketAddr, timeout: Duration) -> RpcClientConfig {
    RpcClientConfig::builder()
        .endpoint(addr.to_string())
        .create_timeout(timeout)
        .search_timeout(timeout)
        .build()
}

pub fn laptop(id: &str, price_usd: f64, cores: u32, ghz: f64, ram_gb: u64) -> Laptop {
    Laptop {
        id: id.to_string(),
        brand: "Dell".to_string(),
        name: format!("XPS {id}"),
        cpu: Some(Cpu {
            brand: "Intel".to_string(),
            name: "Core i7-9750H".to_string(),
            number_cores: cores,
            number_threads: cores * 2,
            min_ghz: ghz,
            max_ghz: ghz + 1.0,
        }),
        ram: Some(Memory {
            value: ram_gb,
            unit: Unit::Gigabyte.into(),
        }),
        price_usd,
        ..Default::default()
    }
}
