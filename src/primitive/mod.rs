mod kdtree;
mod triangle;

pub use kdtree::*;
pub use triangle::*;
