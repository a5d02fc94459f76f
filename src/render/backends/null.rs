use crate::render::backend::{ErasedSurface, PixelFormat, RenderBackend, RgbaImage, SurfaceSize};
use crate::render::RenderList;
use anyhow::{anyhow, Result};
use std::any::Any;

/// Null backend renderer that does not paint anything.
///
/// It counts the frames it was asked to render and keeps the last render list around,
/// which makes it the backend of choice for headless runs and tests.
#[derive(Debug, Default)]
pub struct NullBackend {
    frames: u64,
    last: Option<RenderList>,
}

impl NullBackend {
    /// Creates a new instance of the null backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames rendered so far, with or without a surface.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The render list of the most recent frame.
    pub fn last_frame(&self) -> Option<&RenderList> {
        self.last.as_ref()
    }
}

impl RenderBackend for NullBackend {
    fn name(&self) -> &str {
        "NullBackend"
    }

    fn create_surface(&self, size: SurfaceSize) -> Result<Box<dyn ErasedSurface>> {
        Ok(Box::new(NullSurface::new(size)))
    }

    fn render(&mut self, list: &RenderList, surface: Option<&mut dyn ErasedSurface>) -> Result<()> {
        if let Some(surface) = surface {
            let s = surface
                .as_any_mut()
                .downcast_mut::<NullSurface>()
                .ok_or_else(|| anyhow!("NullBackend used with non-Null surface"))?;
            s.frame_id = s.frame_id.wrapping_add(1);
        }

        self.frames += 1;
        self.last = Some(list.clone());
        Ok(())
    }

    fn snapshot(&mut self, surface: &mut dyn ErasedSurface) -> Result<RgbaImage> {
        let s = surface
            .as_any_mut()
            .downcast_mut::<NullSurface>()
            .ok_or_else(|| anyhow!("NullBackend used with non-Null surface"))?;

        let stride = (s.size.width as usize)
            .checked_mul(4)
            .ok_or_else(|| anyhow!("surface too large"))?;
        let len = s.size.buffer_len(stride).ok_or_else(|| anyhow!("surface too large"))?;

        let pixels = vec![0u8; len];
        RgbaImage::from_raw(pixels, s.size.width, s.size.height, u32::try_from(stride)?, PixelFormat::Rgba8)
            .ok_or_else(|| anyhow!("pixel buffer too small for surface"))
    }
}

pub struct NullSurface {
    /// Size of the surface in pixels.
    pub size: SurfaceSize,
    /// Number of frames painted onto this surface.
    frame_id: u64,
}

impl NullSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self { size, frame_id: 0 }
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }
}

impl ErasedSurface for NullSurface {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn size(&self) -> SurfaceSize {
        self.size
    }
}
