use floorkit_core::{ExportError, Rect};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tiny_skia::Transform;
use tracing::{info, warn};

use super::clipboard::raster_size;
use crate::paint::{paint_plan, PaintContext, PaintMode};
use crate::surface::SvgSurface;
use crate::tasks::CancellationToken;
use crate::transform::MARGIN;

/// Writes the plan inside `bounds` as an SVG document at scale 1.
///
/// The document is built in memory and only written to `out` once painting
/// completed, so an interrupted export writes nothing.
pub fn write_svg<W: Write>(
    mut out: W,
    mut ctx: PaintContext<'_>,
    bounds: Rect,
    cancel: &CancellationToken,
) -> Result<(), ExportError> {
    cancel.check()?;
    let (width, height) = raster_size(&bounds);
    let mut surface = SvgSurface::new(Vec::new(), width as f32, height as f32);
    surface.set_transform(Transform::from_translate(
        MARGIN - bounds.min_x,
        MARGIN - bounds.min_y,
    ));

    ctx.mode = PaintMode::Export;
    ctx.scale = 1.0;
    ctx.area = Rect::new(bounds.min_x - MARGIN, bounds.min_y - MARGIN, width as f32, height as f32);
    paint_plan(&mut surface, &ctx, Some(cancel))?;
    let document = surface.finish()?;

    cancel.check()?;
    out.write_all(&document)?;
    out.flush()?;
    info!("Exported {}x{} SVG ({} bytes)", width, height, document.len());
    Ok(())
}

/// Writes the SVG export to `path`, removing the file when the export fails
/// or is interrupted.
pub fn write_svg_file(
    path: &Path,
    ctx: PaintContext<'_>,
    bounds: Rect,
    cancel: &CancellationToken,
) -> Result<(), ExportError> {
    let result = File::create(path)
        .map_err(ExportError::from)
        .and_then(|file| write_svg(BufWriter::new(file), ctx, bounds, cancel));
    if let Err(err) = &result {
        if path.exists() {
            if let Err(remove) = std::fs::remove_file(path) {
                warn!("Failed to remove partial export {}: {}", path.display(), remove);
            }
        }
        info!("SVG export to {} stopped: {}", path.display(), err);
    }
    result
}
