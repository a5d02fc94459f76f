use crate::render::backend::{ErasedSurface, PixelFormat, RenderBackend, RgbaImage, SurfaceSize};
use crate::render::{Color, DisplayItem, RenderList};
use anyhow::{anyhow, Result};
use std::any::Any;
use std::fs::File;

/// Cairo backend, paints render lists into an owned ARGB32 pixel buffer.
///
/// Image references are treated as paths to PNG files. Images that cannot be loaded are
/// skipped with a warning; the rest of the frame still renders.
#[derive(Debug, Default)]
pub struct CairoBackend;

impl CairoBackend {
    pub fn new() -> Self {
        Self
    }
}

fn set_color(cr: &cairo::Context, color: &Color) {
    cr.set_source_rgba(color.r, color.g, color.b, color.a);
}

fn load_png(image_ref: &str) -> Result<cairo::ImageSurface> {
    let mut file = File::open(image_ref)?;
    Ok(cairo::ImageSurface::create_from_png(&mut file)?)
}

fn paint_item(cr: &cairo::Context, item: &DisplayItem, size: SurfaceSize) -> Result<()> {
    match item {
        DisplayItem::Clear { color } => {
            cr.set_operator(cairo::Operator::Source);
            set_color(cr, color);
            cr.paint()?;
            cr.set_operator(cairo::Operator::Over);
        }
        DisplayItem::Image {
            image_ref,
            x,
            y,
            rotation,
            scale,
            opacity,
            flip_x,
            filter,
            ..
        } => {
            let img = match load_png(image_ref) {
                Ok(img) => img,
                Err(e) => {
                    log::warn!("CairoBackend: cannot load image '{}': {}", image_ref, e);
                    return Ok(());
                }
            };
            if let Some(filter) = filter {
                log::trace!("CairoBackend: filter '{}' not supported, drawing unfiltered", filter);
            }

            // Transform around the surface center, then center the image on the origin
            cr.save()?;
            cr.translate(size.width as f64 / 2.0 + x, size.height as f64 / 2.0 + y);
            cr.rotate(rotation.to_radians());
            cr.scale(if *flip_x { -scale } else { *scale }, *scale);
            cr.set_source_surface(&img, -(img.width() as f64) / 2.0, -(img.height() as f64) / 2.0)?;
            cr.paint_with_alpha(*opacity)?;
            cr.restore()?;
        }
        DisplayItem::DialogueBox { x, y, w, h, color, .. } => {
            set_color(cr, color);
            cr.rectangle(*x, *y, *w, *h);
            cr.fill()?;
        }
        DisplayItem::SpeakerName { text, x, y, size, color } => {
            set_color(cr, color);
            cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
            cr.set_font_size(*size);
            cr.move_to(*x, *y);
            cr.show_text(text)?;
        }
        DisplayItem::DialogueText {
            lines,
            x,
            y,
            size,
            line_height,
            color,
            ..
        } => {
            set_color(cr, color);
            cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
            cr.set_font_size(*size);
            for (row, line) in lines.iter().enumerate() {
                cr.move_to(*x, y + row as f64 * line_height);
                cr.show_text(line)?;
            }
        }
        DisplayItem::EmotionIcon { x, y, size, .. } => {
            cr.set_source_rgba(1.0, 1.0, 1.0, 0.9);
            cr.arc(*x, *y, size / 2.0, 0.0, std::f64::consts::TAU);
            cr.fill()?;
        }
    }

    Ok(())
}

impl RenderBackend for CairoBackend {
    fn name(&self) -> &str {
        "CairoBackend"
    }

    fn create_surface(&self, size: SurfaceSize) -> Result<Box<dyn ErasedSurface>> {
        Ok(Box::new(CairoSurface::new(size)?))
    }

    /// Renders the display items onto a fresh cairo image surface and copies the result
    /// into the pixel buffer of the `CairoSurface`.
    fn render(&mut self, list: &RenderList, surface: Option<&mut dyn ErasedSurface>) -> Result<()> {
        let Some(surface) = surface else {
            log::trace!("CairoBackend: no surface yet, frame deferred");
            return Ok(());
        };

        let s = surface
            .as_any_mut()
            .downcast_mut::<CairoSurface>()
            .ok_or_else(|| anyhow!("CairoBackend used with non-Cairo surface"))?;

        let mut image = cairo::ImageSurface::create(
            cairo::Format::ARgb32,
            i32::try_from(s.size.width)?,
            i32::try_from(s.size.height)?,
        )?;

        {
            let cr = cairo::Context::new(&image)?;
            for item in list.items.iter() {
                paint_item(&cr, item, s.size)?;
            }
        }

        image.flush();
        s.stride = image.stride() as u32;
        let data = image.data()?;
        s.buf.clear();
        s.buf.extend_from_slice(&data);
        s.frame_id = s.frame_id.wrapping_add(1);

        Ok(())
    }

    fn snapshot(&mut self, surface: &mut dyn ErasedSurface) -> Result<RgbaImage> {
        let s = surface
            .as_any_mut()
            .downcast_mut::<CairoSurface>()
            .ok_or_else(|| anyhow!("CairoBackend used with non-Cairo surface"))?;

        RgbaImage::from_raw(s.buf.clone(), s.size.width, s.size.height, s.stride, PixelFormat::PreMulArgb32)
            .ok_or_else(|| anyhow!("nothing rendered onto the surface yet"))
    }
}

/// Pixel buffer owned by the cairo backend. Cairo surfaces themselves are not `Send`,
/// so only the painted pixels are kept between frames.
pub struct CairoSurface {
    buf: Vec<u8>,
    size: SurfaceSize,
    stride: u32,
    frame_id: u64,
}

impl CairoSurface {
    fn new(size: SurfaceSize) -> Result<Self> {
        if size.is_empty() {
            return Err(anyhow!("cannot create a {}x{} cairo surface", size.width, size.height));
        }

        let stride = cairo::Format::ARgb32
            .stride_for_width(size.width)
            .map_err(|_| anyhow!("surface too large"))?;
        let stride = u32::try_from(stride)?;
        let len = size
            .buffer_len(stride as usize)
            .ok_or_else(|| anyhow!("surface too large"))?;

        Ok(Self {
            buf: vec![0u8; len],
            size,
            stride,
            frame_id: 0,
        })
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }
}

impl ErasedSurface for CairoSurface {
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
