use crate::app::colors::Rgba;
use crate::app::Bitmap;

pub(crate) struct FrameView<'a> {
    pub(crate) pixels: &'a mut [u8],
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl FrameView<'_> {
    pub(crate) fn clear(&mut self, color: Rgba) {
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    pub(crate) fn blit(&mut self, bitmap: &Bitmap, x: i32, y: i32) {
        let Some(rect) = self.clip(x, y, bitmap.width(), bitmap.height()) else {
            return;
        };
        let src = bitmap.rgba();
        let src_width = bitmap.width() as usize;
        for out_y in rect.top..rect.bottom {
            let src_y = (out_y as i64 - y as i64) as usize;
            for out_x in rect.left..rect.right {
                let src_x = (out_x as i64 - x as i64) as usize;
                let src_offset = (src_y * src_width + src_x) * 4;
                let color = [
                    src[src_offset],
                    src[src_offset + 1],
                    src[src_offset + 2],
                    src[src_offset + 3],
                ];
                self.blend_pixel(out_x, out_y, color);
            }
        }
    }

    pub(crate) fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba) {
        let Some(rect) = self.clip(x, y, width, height) else {
            return;
        };
        for out_y in rect.top..rect.bottom {
            for out_x in rect.left..rect.right {
                self.blend_pixel(out_x, out_y, color);
            }
        }
    }

    fn clip(&self, x: i32, y: i32, width: u32, height: u32) -> Option<ClipRect> {
        let left = (x as i64).max(0);
        let top = (y as i64).max(0);
        let right = (x as i64 + width as i64).min(self.width as i64);
        let bottom = (y as i64 + height as i64).min(self.height as i64);
        if left >= right || top >= bottom {
            return None;
        }
        Some(ClipRect {
            left: left as usize,
            top: top as usize,
            right: right as usize,
            bottom: bottom as usize,
        })
    }

    fn blend_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        let alpha = color[3];
        if alpha == 0 {
            return;
        }
        let offset = (y * self.width as usize + x) * 4;
        let Some(dst) = self.pixels.get_mut(offset..offset + 4) else {
            return;
        };
        if alpha == u8::MAX {
            dst.copy_from_slice(&color);
            return;
        }
        let src_weight = alpha as u32;
        let dst_weight = 255 - src_weight;
        for channel in 0..3 {
            let mixed = color[channel] as u32 * src_weight + dst[channel] as u32 * dst_weight;
            dst[channel] = ((mixed + 127) / 255) as u8;
        }
        dst[3] = u8::MAX;
    }
}

#[derive(Debug, Clone, Copy)]
struct ClipRect {
    left: usize,
    top: usize,
    right: usize,
    bottom: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::colors::{BLACK, BLUE, RED, WHITE};

    fn pixel(frame: &[u8], width: u32, x: usize, y: usize) -> [u8; 4] {
        let offset = (y * width as usize + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn clear_paints_every_pixel() {
        let mut buffer = vec![0u8; 3 * 2 * 4];
        let mut frame = FrameView {
            pixels: &mut buffer,
            width: 3,
            height: 2,
        };
        frame.clear(BLUE);
        assert!(buffer.chunks_exact(4).all(|pixel| pixel == BLUE));
    }

    #[test]
    fn blit_clips_at_negative_offsets() {
        let mut buffer = vec![0u8; 4 * 4 * 4];
        let mut frame = FrameView {
            pixels: &mut buffer,
            width: 4,
            height: 4,
        };
        frame.clear(BLACK);
        frame.blit(&Bitmap::solid(2, 2, RED), -1, -1);

        assert_eq!(pixel(&buffer, 4, 0, 0), RED);
        assert_eq!(pixel(&buffer, 4, 1, 0), BLACK);
        assert_eq!(pixel(&buffer, 4, 0, 1), BLACK);
    }

    #[test]
    fn blit_fully_outside_is_noop() {
        let mut buffer = vec![0u8; 2 * 2 * 4];
        let mut frame = FrameView {
            pixels: &mut buffer,
            width: 2,
            height: 2,
        };
        frame.blit(&Bitmap::solid(2, 2, RED), 2, 0);
        frame.blit(&Bitmap::solid(2, 2, RED), 0, -2);
        assert!(buffer.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn transparent_pixels_are_skipped() {
        let mut buffer = vec![0u8; 4];
        let mut frame = FrameView {
            pixels: &mut buffer,
            width: 1,
            height: 1,
        };
        frame.clear(WHITE);
        frame.blit(&Bitmap::solid(1, 1, [255, 0, 0, 0]), 0, 0);
        assert_eq!(pixel(&buffer, 1, 0, 0), WHITE);
    }

    #[test]
    fn translucent_fill_blends_with_background() {
        let mut buffer = vec![0u8; 8];
        let mut frame = FrameView {
            pixels: &mut buffer,
            width: 2,
            height: 1,
        };
        frame.clear(BLACK);
        frame.fill_rect(1, 0, 5, 5, [255, 255, 255, 128]);

        assert_eq!(pixel(&buffer, 2, 0, 0), BLACK);
        assert_eq!(pixel(&buffer, 2, 1, 0), [128, 128, 128, 255]);
    }
}
