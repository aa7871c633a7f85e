use hs_demand::DemandError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("demand data error: {0}")]
    Demand(#[from] DemandError),

    #[error(transparent)]
    Core(#[from] hs_core::CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
