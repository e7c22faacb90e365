//! Off-screen rendering through the software rasterizer.

use std::path::Path;

use anyhow::{Context, Result};
use spanlens_engine::atlas::GridAtlas;
use spanlens_engine::coords::ColorRgba;
use spanlens_engine::raster::{self, Framebuffer};

use crate::scene::{Scene, LABEL_COLOR};

/// Rasterizes `scene` into a `width`×`height` framebuffer cleared to `clear`.
pub fn rasterize(
    scene: &Scene,
    atlas: Option<&GridAtlas>,
    width: u32,
    height: u32,
    clear: ColorRgba,
) -> Result<Framebuffer> {
    let mut fb = Framebuffer::new(width, height).context("invalid output size")?;
    fb.clear(clear);

    for (color, geometry) in &scene.boxes {
        raster::draw_boxes(&mut fb, geometry, scene.box_view, *color);
    }
    if let Some(atlas) = atlas {
        raster::draw_glyphs(&mut fb, &scene.labels, scene.label_view, LABEL_COLOR, atlas.image());
    }

    Ok(fb)
}

/// Writes `fb` as an RGBA PNG.
pub fn write_png(fb: &Framebuffer, path: &Path) -> Result<()> {
    let image = image::RgbaImage::from_raw(fb.width(), fb.height(), fb.to_rgba8())
        .context("framebuffer size does not match its pixel data")?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("wrote {}x{} image to {}", fb.width(), fb.height(), path.display());
    Ok(())
}
