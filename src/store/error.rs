use crate::laptop::LaptopId;

/// Indicates that a laptop could not be saved because its id is already taken.
#[derive(Debug, thiserror::Error)]
#[error("a laptop with id ({laptop_id}) already exists")]
pub struct LaptopAlreadyExists {
    pub laptop_id: LaptopId,
}

/// Indicates that no laptop is stored under the requested id.
#[derive(Debug, thiserror::Error)]
#[error("no laptop with id ({laptop_id}) could be found")]
pub struct LaptopNotFound {
    pub laptop_id: LaptopId,
}
