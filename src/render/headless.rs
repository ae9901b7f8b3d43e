//! Software stand-in for a browser engine.
//!
//! Lets the server run end to end without an embedded web engine. The
//! "page" is a flat colour derived from the current URL with an address
//! bar strip; clicks leave crosshair marks and typed keys show up as a row
//! of blocks in the strip. Backspace removes the last block.

use image::{Rgba, RgbaImage};

use super::error::SurfaceError;
use super::input::{InputEvent, KeyCode};
use super::surface::{InputTarget, RenderSurface};

const BAR_HEIGHT: u32 = 32;
/// Only the most recent clicks are drawn
const MAX_MARKS: usize = 16;

pub struct HeadlessSurface {
    width: u32,
    height: u32,
    url: String,
    focused: bool,
    marks: Vec<(i32, i32)>,
    typed: usize,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            url: "about:blank".to_string(),
            focused: false,
            marks: Vec::new(),
            typed: 0,
        }
    }

    /// Key blocks that fit in the address bar.
    fn max_typed(&self) -> usize {
        (self.width.saturating_sub(8) / 8) as usize
    }

    /// Page colour from an FNV-1a hash of the URL.
    fn page_color(&self) -> Rgba<u8> {
        let hash = self
            .url
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| (h ^ b as u64).wrapping_mul(0x100_0000_01b3));
        // Keep it light so the marks stay visible
        let [r, g, b, ..] = hash.to_le_bytes();
        Rgba([128 | r, 128 | g, 128 | b, 255])
    }

    fn fill(image: &mut RgbaImage, x0: i64, y0: i64, w: i64, h: i64, color: Rgba<u8>) {
        let (iw, ih) = (image.width() as i64, image.height() as i64);
        for y in y0.max(0)..(y0 + h).min(ih) {
            for x in x0.max(0)..(x0 + w).min(iw) {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

impl RenderSurface for HeadlessSurface {
    fn render(&mut self) -> Result<RgbaImage, SurfaceError> {
        let mut image = RgbaImage::from_pixel(self.width, self.height, self.page_color());
        let bar = Rgba([60, 60, 60, 255]);
        let ink = Rgba([240, 240, 240, 255]);
        let mark = Rgba([200, 0, 0, 255]);

        Self::fill(&mut image, 0, 0, self.width as i64, BAR_HEIGHT as i64, bar);
        for i in 0..self.typed as i64 {
            Self::fill(&mut image, 8 + i * 8, 8, 6, 16, ink);
        }
        for &(x, y) in &self.marks {
            let (x, y) = (x as i64, y as i64);
            Self::fill(&mut image, x - 6, y, 13, 1, mark);
            Self::fill(&mut image, x, y - 6, 1, 13, mark);
        }
        Ok(image)
    }

    fn dispatch(&mut self, _target: InputTarget, event: &InputEvent) -> Result<(), SurfaceError> {
        match event {
            InputEvent::MousePress { .. } => {}
            InputEvent::MouseRelease { x, y, .. } => {
                if self.marks.len() == MAX_MARKS {
                    self.marks.remove(0);
                }
                self.marks.push((*x, *y));
                self.focused = true;
            }
            InputEvent::KeyPress { code, .. } if *code == KeyCode::BACKSPACE => {
                self.typed = self.typed.saturating_sub(1);
            }
            InputEvent::KeyPress { code, .. } if *code == KeyCode::RETURN => {
                self.typed = 0;
            }
            InputEvent::KeyPress { .. } => {
                if self.typed < self.max_typed() {
                    self.typed += 1;
                }
            }
            InputEvent::KeyRelease { .. } => {}
        }
        Ok(())
    }

    fn load(&mut self, url: &str) -> Result<(), SurfaceError> {
        if url.chars().any(char::is_whitespace) {
            return Err(SurfaceError::Load {
                url: url.to_string(),
                reason: "whitespace in URL".to_string(),
            });
        }
        self.url = url.to_string();
        self.focused = false;
        self.marks.clear();
        self.typed = 0;
        Ok(())
    }

    fn focus_target(&self) -> InputTarget {
        if self.focused {
            InputTarget::Focused
        } else {
            InputTarget::Surface
        }
    }

    fn url(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::input::MouseButton;

    #[test]
    fn test_render_size_matches_viewport() {
        let mut surface = HeadlessSurface::new(320, 200);
        let image = surface.render().unwrap();
        assert_eq!(image.dimensions(), (320, 200));
    }

    #[test]
    fn test_click_marks_and_focuses() {
        let mut surface = HeadlessSurface::new(100, 100);
        assert_eq!(surface.focus_target(), InputTarget::Surface);

        let button = MouseButton::Left;
        surface.dispatch(InputTarget::Surface, &InputEvent::MousePress { x: 50, y: 60, button }).unwrap();
        surface.dispatch(InputTarget::Surface, &InputEvent::MouseRelease { x: 50, y: 60, button }).unwrap();

        assert_eq!(surface.focus_target(), InputTarget::Focused);
        let image = surface.render().unwrap();
        assert_eq!(*image.get_pixel(50, 60), Rgba([200, 0, 0, 255]));
    }

    #[test]
    fn test_out_of_bounds_click_is_harmless() {
        let mut surface = HeadlessSurface::new(10, 10);
        let button = MouseButton::Left;
        surface.dispatch(InputTarget::Surface, &InputEvent::MouseRelease { x: -50, y: 9000, button }).unwrap();
        assert!(surface.render().is_ok());
    }

    #[test]
    fn test_load_changes_page_and_resets_state() {
        let mut surface = HeadlessSurface::new(64, 64);
        let before = *surface.render().unwrap().get_pixel(0, 63);
        surface.dispatch(InputTarget::Surface, &InputEvent::KeyPress { code: KeyCode(65), text: "a".into() }).unwrap();

        surface.load("https://example.com").unwrap();
        assert_eq!(surface.url(), "https://example.com");
        assert_eq!(surface.typed, 0);
        assert_ne!(*surface.render().unwrap().get_pixel(0, 63), before);
    }

    #[test]
    fn test_load_rejects_whitespace() {
        let mut surface = HeadlessSurface::new(8, 8);
        assert!(surface.load("https://bad url").is_err());
        assert_eq!(surface.url(), "about:blank");
    }

    #[test]
    fn test_backspace_removes_typed_key() {
        let mut surface = HeadlessSurface::new(64, 64);
        let key = |code| InputEvent::KeyPress { code, text: String::new() };
        surface.dispatch(InputTarget::Surface, &key(KeyCode(65))).unwrap();
        surface.dispatch(InputTarget::Surface, &key(KeyCode(66))).unwrap();
        surface.dispatch(InputTarget::Surface, &key(KeyCode::BACKSPACE)).unwrap();
        assert_eq!(surface.typed, 1);
    }

    #[test]
    fn test_typed_keys_capped_at_bar_width() {
        let mut surface = HeadlessSurface::new(64, 64);
        let key = |code| InputEvent::KeyPress { code, text: String::new() };
        for _ in 0..100 {
            surface.dispatch(InputTarget::Surface, &key(KeyCode(65))).unwrap();
        }
        assert_eq!(surface.typed, 7);

        surface.dispatch(InputTarget::Surface, &key(KeyCode::BACKSPACE)).unwrap();
        assert_eq!(surface.typed, 6);
        assert!(surface.render().is_ok());
    }
}
