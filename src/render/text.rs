//! Label text drawn with the embedded DejaVu Sans face.

use ab_glyph::{FontRef, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

static FONT_DATA: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Measures and draws text; without a usable font every label is skipped.
pub struct Labeler {
    font: Option<FontRef<'static>>,
}

impl Labeler {
    /// Parse the embedded font.
    ///
    /// If the font cannot be parsed, the map is still drawn, only without text.
    pub fn new() -> Self {
        let font = match FontRef::try_from_slice(FONT_DATA) {
            Ok(font) => Some(font),
            Err(e) => {
                log::warn!("Embedded font could not be loaded, labels are skipped: {}", e);
                None
            }
        };
        Self { font }
    }

    /// Width and height in pixels of `text` at `px` pixels per em.
    pub fn size(&self, text: &str, px: f32) -> (u32, u32) {
        match &self.font {
            Some(font) => text_size(PxScale::from(px), font, text),
            None => (0, 0),
        }
    }

    /// Draw `text` with its top-left corner at (`x`, `y`).
    pub fn draw(&self, image: &mut RgbaImage, x: i32, y: i32, px: f32, text: &str, color: Rgba<u8>) {
        if let Some(font) = &self.font {
            draw_text_mut(image, color, x, y, PxScale::from(px), font, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn rendered(text: &str) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(160, 40, WHITE);
        Labeler::new().draw(&mut image, 4, 4, 16.0, text, BLACK);
        image
    }

    #[test]
    fn embedded_font_loads() {
        assert!(Labeler::new().font.is_some());
    }

    #[test]
    fn longer_text_is_wider() {
        let labeler = Labeler::new();
        let (short, height) = labeler.size("8", 16.0);
        let (long, _) = labeler.size("Mesh Routers", 16.0);
        assert!(short > 0 && height > 0);
        assert!(long > short);
    }

    #[test]
    fn text_paints_pixels() {
        assert!(rendered("Mesh Routers").pixels().any(|p| *p != WHITE));
        assert!(rendered("").pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn case_is_preserved() {
        assert_ne!(rendered("Mesh Routers"), rendered("MESH ROUTERS"));
    }
}
