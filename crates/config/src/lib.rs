// Estate registry
// Loaded from ~/.config/ffbaudit/estates.toml

pub mod registry;

pub use registry::{Estate, EstateRegistry, RegistryError};
