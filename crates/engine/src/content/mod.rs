mod audio_clip;
mod images;
mod layer;

pub use audio_clip::AudioClip;
pub use images::{AssetError, DiskImageLoader, ImageLoader};
pub use layer::{LayerDocument, LayerError, TilesetEntry};
