use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::{Rect, Vec2};

use super::font::{draw_text_into, wrap_text, LINE_ADVANCE_PX};
use super::surface::{RenderError, RenderSurface, Rgba, SpriteId, SCREEN_HEIGHT, SCREEN_WIDTH};

const CLEAR_COLOR: Rgba = [20, 22, 28, 255];
const PLACEHOLDER_COLOR: Rgba = [220, 220, 240, 255];

struct LoadedSprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// `pixels`-backed surface with a fixed 640x480 back buffer scaled to the window.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    asset_root: PathBuf,
    sprite_cache: HashMap<SpriteId, Option<LoadedSprite>>,
    warned_missing_sprites: HashSet<SpriteId>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, asset_root: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            asset_root,
            sprite_cache: HashMap::new(),
            warned_missing_sprites: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width.max(1), height.max(1), window);
        Pixels::new(SCREEN_WIDTH, SCREEN_HEIGHT, surface)
    }

    fn ensure_sprite_loaded(&mut self, sprite: SpriteId) {
        let asset_root = self.asset_root.as_path();
        let warned = &mut self.warned_missing_sprites;
        self.sprite_cache.entry(sprite).or_insert_with(|| {
            let path = asset_root.join(sprite.asset_path());
            match load_sprite_rgba(&path) {
                Ok(loaded) => Some(loaded),
                Err(reason) => {
                    if warned.insert(sprite) {
                        warn!(
                            sprite = ?sprite,
                            path = %path.display(),
                            reason = %reason,
                            "sprite_load_failed_using_placeholder"
                        );
                    }
                    None
                }
            }
        });
    }
}

impl RenderSurface for Renderer {
    fn clear(&mut self) {
        for chunk in self.pixels.frame_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }
    }

    fn draw_sprite(&mut self, sprite: SpriteId, dest: Rect, src: Rect) {
        self.ensure_sprite_loaded(sprite);
        let frame = self.pixels.frame_mut();
        match self.sprite_cache.get(&sprite).and_then(Option::as_ref) {
            Some(loaded) => blit_scaled(frame, SCREEN_WIDTH, SCREEN_HEIGHT, loaded, dest, src),
            None => fill_rect_px(
                frame,
                SCREEN_WIDTH,
                SCREEN_HEIGHT,
                dest.x as i32,
                dest.y as i32,
                dest.width as i32,
                dest.height as i32,
                PLACEHOLDER_COLOR,
            ),
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        fill_rect_px(
            self.pixels.frame_mut(),
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            rect.x as i32,
            rect.y as i32,
            rect.width as i32,
            rect.height as i32,
            color,
        );
    }

    fn draw_text(&mut self, text: &str, position: Vec2, color: Rgba) {
        draw_text_into(
            self.pixels.frame_mut(),
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            position.x as i32,
            position.y as i32,
            text,
            color,
        );
    }

    fn draw_text_wrapped(&mut self, text: &str, position: Vec2, max_width: f32, color: Rgba) {
        let mut y = position.y as i32;
        for line in wrap_text(text, max_width) {
            draw_text_into(
                self.pixels.frame_mut(),
                SCREEN_WIDTH,
                SCREEN_HEIGHT,
                position.x as i32,
                y,
                &line,
                color,
            );
            y += LINE_ADVANCE_PX;
        }
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.pixels.render().map_err(RenderError::Present)
    }
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn write_pixel_rgba(frame: &mut [u8], width: usize, x: usize, y: usize, color: Rgba) {
    let Some(byte_offset) = y
        .checked_mul(width)
        .and_then(|row| row.checked_add(x))
        .and_then(|pixel| pixel.checked_mul(4))
    else {
        return;
    };
    if let Some(pixel) = frame.get_mut(byte_offset..byte_offset + 4) {
        pixel.copy_from_slice(&color);
    }
}

#[allow(clippy::too_many_arguments)]
pub(super) fn fill_rect_px(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: Rgba,
) {
    let start_x = x.max(0);
    let start_y = y.max(0);
    let end_x = x.saturating_add(rect_width).min(width as i32);
    let end_y = y.saturating_add(rect_height).min(height as i32);
    if end_x <= start_x || end_y <= start_y {
        return;
    }

    for py in start_y..end_y {
        for px in start_x..end_x {
            write_pixel_rgba(frame, width as usize, px as usize, py as usize, color);
        }
    }
}

/// Nearest-neighbour copy of `src` (sprite pixels) into `dest` (frame pixels).
/// Fully transparent source pixels are skipped.
fn blit_scaled(
    frame: &mut [u8],
    width: u32,
    height: u32,
    sprite: &LoadedSprite,
    dest: Rect,
    src: Rect,
) {
    if sprite.width == 0 || sprite.height == 0 || dest.width <= 0.0 || dest.height <= 0.0 {
        return;
    }
    if sprite.rgba.len() < sprite.width as usize * sprite.height as usize * 4 {
        return;
    }
    let (src_w, src_h) = if src.width > 0.0 && src.height > 0.0 {
        (src.width, src.height)
    } else {
        (sprite.width as f32, sprite.height as f32)
    };

    let left = dest.x as i32;
    let top = dest.y as i32;
    let right = (dest.x + dest.width) as i32;
    let bottom = (dest.y + dest.height) as i32;
    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = right.min(width as i32);
    let draw_bottom = bottom.min(height as i32);

    for out_y in draw_top..draw_bottom {
        let v = (out_y - top) as f32 / dest.height;
        let src_y = (src.y + v * src_h).floor() as u32;
        let src_y = src_y.min(sprite.height - 1) as usize;
        for out_x in draw_left..draw_right {
            let u = (out_x - left) as f32 / dest.width;
            let src_x = (src.x + u * src_w).floor() as u32;
            let src_x = src_x.min(sprite.width - 1) as usize;
            let src_offset = (src_y * sprite.width as usize + src_x) * 4;
            let alpha = sprite.rgba[src_offset + 3];
            if alpha == 0 {
                continue;
            }
            let color = [
                sprite.rgba[src_offset],
                sprite.rgba[src_offset + 1],
                sprite.rgba[src_offset + 2],
                alpha,
            ];
            write_pixel_rgba(frame, width as usize, out_x as usize, out_y as usize, color);
        }
    }
}
