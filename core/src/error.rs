use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Square ids must follow their grid order")]
    MisnumberedSquares,
}

pub type Result<T> = core::result::Result<T, GameError>;
