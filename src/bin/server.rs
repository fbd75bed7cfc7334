use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use pcbook_rpc::grpc::{self, IdAssigner};
use pcbook_rpc::sample;
use pcbook_rpc::store::LaptopStore;
use tracing::info;

/// Serve an in-memory laptop catalog.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Port to listen on.
    #[arg(short, long, env = "CATALOG_PORT", default_value_t = 8080)]
    port: u16,

    /// Assign ids 1, 2, 3, ... instead of random UUIDs.
    #[arg(long)]
    sequential_ids: bool,

    /// Number of random laptops to seed the catalog with.
    #[arg(long, default_value_t = 0)]
    seed_laptops: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let store = Arc::new(LaptopStore::new());
    for _ in 0..cli.seed_laptops {
        store.save(sample::new_laptop())?;
    }
    if cli.seed_laptops > 0 {
        info!(count = store.len(), "Seeded catalog");
    }

    let ids = if cli.sequential_ids {
        IdAssigner::sequential()
    } else {
        IdAssigner::Uuid
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    grpc::start_server(addr, store, ids).await
}
