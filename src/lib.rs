pub mod client;
pub mod filter;
pub mod grpc;
pub mod laptop;
pub mod rpc;
pub mod sample;
pub mod state_machine;
pub mod store;

pub mod catalog_proto {
    include!(concat!(env!("OUT_DIR"), "/pcbook.rs"));
}

pub use client::{CreateOutcome, LaptopClient};
pub use laptop::LaptopId;

/// Default address the demo server listens on and the driver dials.
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:8080";
