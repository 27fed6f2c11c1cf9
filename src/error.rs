use bacterio_common::HexCoord;
use thiserror::Error;

/// A population that cannot belong to the field it was handed with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidStateError {
    #[error("bacteria placed at ({}, {}) outside the field", .0.q, .0.r)]
    BacteriaOutsideField(HexCoord),
    #[error("predator placed at ({}, {}) outside the field", .0.q, .0.r)]
    PredatorOutsideField(HexCoord),
    #[error("snapshot declares an empty field")]
    EmptyField,
}
