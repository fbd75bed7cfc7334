use anyhow::{Context, Result};
use clap::Parser;
use pcbook_rpc::catalog_proto::memory::Unit;
use pcbook_rpc::catalog_proto::{Filter, Memory};
use pcbook_rpc::rpc::RpcClientConfig;
use pcbook_rpc::{CreateOutcome, DEFAULT_ADDRESS, LaptopClient, sample};
use tracing::info;

const CREATE_COUNT: usize = 10;

/// Create sample laptops on a catalog server, then search it.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Address of the catalog server.
    #[arg(short, long, env = "CATALOG_ADDRESS", default_value = DEFAULT_ADDRESS)]
    address: String,

    /// Search with a randomly generated filter instead of the default one.
    #[arg(long)]
    random_filter: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    info!(address = %cli.address, "Dialing server");

    let config = RpcClientConfig::builder().endpoint(cli.address).build();
    let client = LaptopClient::connect(&config)
        .await
        .context("cannot dial server")?;

    for _ in 0..CREATE_COUNT {
        create_laptop(&client).await?;
    }

    let filter = if cli.random_filter {
        sample::new_filter()
    } else {
        Filter {
            max_price_usd: 3000.0,
            min_cpu_cores: 4,
            min_cpu_ghz: 2.5,
            min_ram: Some(Memory {
                value: 8,
                unit: Unit::Gigabyte.into(),
            }),
        }
    };
    search_laptop(&client, filter).await?;

    Ok(())
}

async fn create_laptop(client: &LaptopClient) -> Result<()> {
    let mut laptop = sample::new_laptop();
    laptop.id.clear();

    match client
        .create_laptop(laptop)
        .await
        .context("cannot create laptop")?
    {
        CreateOutcome::Created(id) => info!(id = %id, "Created laptop"),
        CreateOutcome::AlreadyExists => info!("Laptop already exists"),
    }

    Ok(())
}

async fn search_laptop(client: &LaptopClient, filter: Filter) -> Result<()> {
    let mut stream = client
        .search_laptop(filter)
        .await
        .context("cannot search laptop")?;

    while let Some(response) = stream.next().await.context("cannot receive laptop")? {
        let Some(laptop) = response.laptop else {
            continue;
        };
        info!(
            id = %laptop.id,
            brand = %laptop.brand,
            name = %laptop.name,
            price_usd = laptop.price_usd,
            "Found laptop"
        );
    }

    info!(found = stream.received(), "Search finished");

    Ok(())
}
