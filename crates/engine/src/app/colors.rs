pub type Rgba = [u8; 4];

pub const BLACK: Rgba = [0, 0, 0, 255];
pub const WHITE: Rgba = [255, 255, 255, 255];
pub const BLUE: Rgba = [0, 0, 255, 255];
pub const GREEN: Rgba = [0, 255, 0, 255];
pub const RED: Rgba = [255, 0, 0, 255];
pub const ALPHA: Rgba = [255, 0, 238, 255];
pub const HIGHLIGHT: Rgba = [255, 255, 255, 64];

/// Icon pixels of this colour become fully transparent.
pub const ICON_COLOR_KEY: [u8; 3] = [100, 100, 100];
