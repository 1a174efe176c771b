// error_handling.rs - Error taxonomy for the tile rendering buffers
//
// Only recoverable caller mistakes live here. Setup-order violations
// (querying the text layout early, updating a slot that was never inserted)
// are programming errors and panic at the point of misuse.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RendererError {
    #[error("Tile ({x}, {y}) is outside the {width}x{height} maze")]
    TileOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("Unknown color name: {0}")]
    UnknownColorName(String),

    #[error("Unknown color character: {0:?}")]
    UnknownColorChar(char),

    #[error("Unknown direction character: {0:?}")]
    UnknownDirectionChar(char),

    #[error("Unknown text alignment: {0}")]
    UnknownAlignment(String),

    #[error("Invalid maze data: {reason}")]
    InvalidMazeData { reason: String },

    #[error("Invalid text layout: {reason}")]
    InvalidTextLayout { reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RendererError>;
