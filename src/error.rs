use thiserror::Error;

use crate::config::ConfigError;
use crate::detection::DetectionError;
use crate::input::InputError;
use crate::output::OutputError;

/// Any error surfaced by logwarden
#[derive(Error, Debug)]
pub enum LogwardenError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Output(#[from] OutputError),
}
