use snafu::prelude::*;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to lock mutex: poisoned"))]
    LockPoisoned,

    #[snafu(display("A route navigation is already active ({pending} destinations pending)"))]
    RouteInProgress { pending: usize },

    #[snafu(display("Invalid router config: {source}"))]
    InvalidConfig { source: toml::de::Error },

    #[snafu(display("Failed to read router config {}: {source}", path.display()))]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
