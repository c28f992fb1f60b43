pub mod blend;
pub mod color;
pub mod commands;
pub mod history;
pub mod id;
pub mod raster;
pub mod session;
pub mod state;
pub mod tools;
pub mod util;

pub use color::Argb;
pub use commands::{CanvasCommand, CommandError};
pub use history::HistoryManager;
pub use id::{LayerId, LayerIdGenerator};
pub use session::{EditingSession, GestureOutcome};
pub use state::{CanvasDocument, Layer, LayerManager, PixelBuffer};
pub use tools::{ShapeMode, Tool};
pub use util::Point;
