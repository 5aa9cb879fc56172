use std::sync::Arc;

use crate::id_generator;

/// A fully decoded bitmap at the source's natural dimensions.
///
/// Pixels are RGBA8, row-major. Cloning shares the pixel buffer.
#[derive(Clone)]
pub struct DecodedImage {
    id: u64,
    width: u32,
    height: u32,
    pixels: Arc<image::RgbaImage>,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl DecodedImage {
    pub fn new(pixels: image::RgbaImage) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            id: id_generator::generate_id(),
            width,
            height,
            pixels: Arc::new(pixels),
        }
    }

    /// Wraps a decoded image without resampling.
    pub fn from_dynamic(image: image::DynamicImage) -> Self {
        Self::new(image.into_rgba8())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }

    pub fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }

    /// Whether both sides are within a GPU texture's maximum side.
    pub fn fits_texture(&self, max_side: usize) -> bool {
        self.width as usize <= max_side && self.height as usize <= max_side
    }

    /// Copy of the pixels in the layout egui textures take.
    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_unmultiplied(self.size(), self.pixels.as_raw())
    }
}
