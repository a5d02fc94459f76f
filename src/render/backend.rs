use crate::render::RenderList;
use std::any::Any;

/// Largest pixel buffer a CPU backend will allocate (16k x 16k RGBA).
pub const MAX_SURFACE_BYTES: usize = 16_384 * 16_384 * 4;

/// Size of a surface in pixels. It's a simple struct to hold width and height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A surface without pixels cannot be drawn on.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bytes needed for `height` rows of `stride` bytes each.
    ///
    /// Returns `None` when the buffer would exceed [`MAX_SURFACE_BYTES`].
    pub fn buffer_len(&self, stride: usize) -> Option<usize> {
        stride
            .checked_mul(self.height as usize)
            .filter(|len| *len <= MAX_SURFACE_BYTES)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8,
    PreMulArgb32,
}

/// Copy of the pixels of a surface, handed to the host for presenting or saving.
#[derive(Clone)]
pub struct RgbaImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub format: PixelFormat,
}

impl RgbaImage {
    /// Wraps a pixel buffer. Returns `None` when the buffer is too small for the given dimensions.
    pub fn from_raw(pixels: Vec<u8>, width: u32, height: u32, stride: u32, format: PixelFormat) -> Option<Self> {
        let needed = (height as usize).checked_mul(stride as usize)?;
        if pixels.len() < needed {
            return None;
        }

        Some(Self {
            pixels,
            width,
            height,
            stride,
            format,
        })
    }
}

impl std::fmt::Debug for RgbaImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbaImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.pixels.len())
            .finish()
    }
}

/// Type-erased surface so the screen can hold it without generics.
pub trait ErasedSurface: Any + Send {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn size(&self) -> SurfaceSize;
}

/// Core backend interface. All calls happen on the task that owns the screen.
pub trait RenderBackend: Send {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Create a new surface with the given size.
    fn create_surface(&self, size: SurfaceSize) -> anyhow::Result<Box<dyn ErasedSurface>>;

    /// Paint one frame.
    ///
    /// `surface` is `None` when no surface is available yet (for instance before the host
    /// has sized the screen). Backends must accept that and treat the frame as deferred.
    fn render(&mut self, list: &RenderList, surface: Option<&mut dyn ErasedSurface>) -> anyhow::Result<()>;

    /// Copy the current pixels of the surface.
    fn snapshot(&mut self, surface: &mut dyn ErasedSurface) -> anyhow::Result<RgbaImage>;
}
