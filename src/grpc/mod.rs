mod server;

pub use server::{IdAssigner, LaptopServiceImpl, serve_with_listener, start_server};
