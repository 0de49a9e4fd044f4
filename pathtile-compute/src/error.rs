//! Session error types.

use pathtile_core::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No render devices given")]
    NoDevices,

    #[error("Device {0} has no path state capacity")]
    ZeroCapacity(String),

    #[error("Invalid session configuration: {0}")]
    Config(#[from] ConfigError),
}
