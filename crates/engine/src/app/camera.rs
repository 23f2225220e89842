use super::input::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Camera {
    offset: PixelPos,
    viewport: Viewport,
    world_size: (u32, u32),
    tile_edge: u32,
}

impl Camera {
    pub fn new(viewport: Viewport, world_size: (u32, u32), tile_edge: u32) -> Self {
        Self {
            offset: PixelPos::default(),
            viewport,
            world_size,
            tile_edge: tile_edge.max(1),
        }
    }

    pub fn offset(&self) -> PixelPos {
        self.offset
    }

    pub fn min_offset(&self) -> PixelPos {
        PixelPos {
            x: min_axis_offset(self.world_size.0, self.viewport.width),
            y: min_axis_offset(self.world_size.1, self.viewport.height),
        }
    }

    pub fn move_by(&mut self, direction: Direction, speed: u32) -> bool {
        let speed = i32::try_from(speed).unwrap_or(i32::MAX);
        let min = self.min_offset();
        let mut next = self.offset;
        // Scrolling the view right moves the world left.
        match direction {
            Direction::Up => next.y = next.y.saturating_add(speed),
            Direction::Down => next.y = next.y.saturating_sub(speed),
            Direction::Left => next.x = next.x.saturating_add(speed),
            Direction::Right => next.x = next.x.saturating_sub(speed),
        }
        // Dropped, not clamped: the view may stop short of the edge by less than one step.
        let in_range = (min.x..=0).contains(&next.x) && (min.y..=0).contains(&next.y);
        if !in_range || next == self.offset {
            return false;
        }
        self.offset = next;
        true
    }

    /// Maps a viewport pixel to the grid cell under it. The result is not bounds-checked.
    pub fn pixel_to_cell(&self, pointer: PixelPos) -> (i64, i64) {
        let edge = self.tile_edge as i64;
        let world_x = pointer.x as i64 + (self.offset.x as i64).abs();
        let world_y = pointer.y as i64 + (self.offset.y as i64).abs();
        (world_x.div_euclid(edge), world_y.div_euclid(edge))
    }

    pub fn cell_to_pixel(&self, x: u32, y: u32) -> PixelPos {
        let edge = self.tile_edge as i64;
        PixelPos {
            x: clamp_to_i32(x as i64 * edge + self.offset.x as i64),
            y: clamp_to_i32(y as i64 * edge + self.offset.y as i64),
        }
    }
}

fn min_axis_offset(world: u32, viewport: u32) -> i32 {
    if world <= viewport {
        return 0;
    }
    clamp_to_i32(-((world - viewport) as i64))
}

fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
