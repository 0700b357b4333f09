//! Print, clipboard and vector exporters.
//!
//! Every exporter runs [`paint_plan`](crate::paint::paint_plan) against its
//! own target: paged print surfaces, a 1:1 raster of the selection, or an
//! SVG stream.

mod clipboard;
mod print;
mod vector;

pub use clipboard::{raster_size, render_clipboard, write_png};
pub use print::{print_layout, print_page, PageFormat, PrintLayout, POINTS_PER_CM};
pub use vector::{write_svg, write_svg_file};

use crate::cache::{item_bounds, CacheInputs};
use crate::paint::{BORDER_STROKE_WIDTH, WALL_STROKE_WIDTH};
use floorkit_core::{ItemRef, PlanModel, Rect};

/// Which items an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportScope {
    pub selection_only: bool,
    pub include_camera: bool,
}

impl ExportScope {
    pub const PRINT: Self = Self {
        selection_only: false,
        include_camera: true,
    };
    pub const CLIPBOARD: Self = Self {
        selection_only: true,
        include_camera: false,
    };
    pub const VECTOR: Self = Self {
        selection_only: false,
        include_camera: false,
    };

    fn covers(&self, model: &PlanModel, item: &ItemRef<'_>) -> bool {
        if matches!(item, ItemRef::Camera(_)) && !self.include_camera {
            return false;
        }
        !self.selection_only || model.is_selected(item.id())
    }
}

/// Items at the selected level the export covers.
fn exported_items<'m>(model: &'m PlanModel, scope: ExportScope) -> Vec<ItemRef<'m>> {
    model
        .items_at_level(model.selected_level)
        .into_iter()
        .filter(|item| scope.covers(model, item))
        .collect()
}

/// Half the thickest stroke used by `items`.
pub fn stroke_padding(items: &[ItemRef<'_>]) -> f32 {
    let has_walls = items
        .iter()
        .any(|item| matches!(item, ItemRef::Wall(_) | ItemRef::Room(_)));
    if has_walls {
        WALL_STROKE_WIDTH / 2.0
    } else {
        BORDER_STROKE_WIDTH / 2.0
    }
}

/// Bounds of the exported items with their texts, padded by
/// [`stroke_padding`]. `None` when nothing is exported.
pub fn export_bounds(
    model: &PlanModel,
    inputs: &CacheInputs<'_>,
    scope: ExportScope,
) -> Option<Rect> {
    let items = exported_items(model, scope);
    let bounds = items
        .iter()
        .filter_map(|item| item_bounds(model, item, inputs))
        .reduce(|a, b| a.union(&b))?;
    Some(bounds.expanded(stroke_padding(&items)))
}
