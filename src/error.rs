use thiserror::Error;

use crate::engine::SurfaceId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown surface {0}")]
    UnknownSurface(SurfaceId),

    #[error("unknown gesture '{0}'")]
    UnknownGesture(String),

    #[error("unknown modifier '{modifier}' in binding '{binding}'")]
    UnknownModifier { binding: String, modifier: String },

    #[error("direction qualifier '{qualifier}' only applies to swipe (binding '{binding}')")]
    MisplacedDirection { binding: String, qualifier: String },

    #[error("option {name} must be a finite non-negative number, got {value}")]
    InvalidOption { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
