use floorkit_core::event_bus::{FurnitureProperty, PlanEvent, PlanEventBus, PreferenceChange};
use floorkit_core::model::{ContentRef, Furniture, ModelRef};
use floorkit_core::{Color, IconError, PlanModel};
use floorkit_plan::icons::FurnitureModelRef;
use floorkit_plan::surface::DrawOp;
use floorkit_plan::{
    IconRenderer, IconState, ImageCache, InlineSpawner, PaintMode, Paintable,
    PlanView, RecordingSurface, TextMetrics, TokioSpawner, TopViewIconProvider, ViewServices,
};
use floorkit_settings::Config;
use image::{Rgba, RgbaImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

const SIZE: u32 = 16;

/// Draws a red square in the middle of the requested background.
#[derive(Debug, Default)]
struct SquareRenderer {
    renders: AtomicUsize,
    /// When set, every render waits for one token.
    gate: Option<Mutex<mpsc::Receiver<()>>>,
}

impl IconRenderer for SquareRenderer {
    fn is_available(&self) -> bool {
        true
    }

    fn render_top_view(
        &self,
        _model: &FurnitureModelRef,
        size: u32,
        background: Rgba<u8>,
    ) -> Result<RgbaImage, IconError> {
        if let Some(gate) = &self.gate {
            gate.lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(5))
                .map_err(|e| IconError::BakeFailed {
                    reason: e.to_string(),
                })?;
        }
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(RgbaImage::from_fn(size, size, |x, y| {
            let inside = (size / 4..3 * size / 4).contains(&x) && (size / 4..3 * size / 4).contains(&y);
            if inside {
                Rgba([220, 0, 0, 255])
            } else {
                background
            }
        }))
    }
}

fn chair() -> Furniture {
    let mut piece = Furniture::new("Chair", 100.0, 100.0, 45.0, 50.0, 90.0);
    piece.model = Some(ModelRef {
        name: "Chair".to_string(),
        content: ContentRef::new("chair.obj", vec![1, 2, 3]),
    });
    piece
}

fn provider(renderer: Arc<dyn IconRenderer>) -> TopViewIconProvider {
    TopViewIconProvider::new(
        renderer,
        Arc::new(InlineSpawner),
        Arc::new(ImageCache::new()),
        SIZE,
    )
}

#[test]
fn test_inline_bake_is_transparent_outside_model() {
    let renderer = Arc::new(SquareRenderer::default());
    let icons = provider(renderer.clone());
    let state = icons.icon_for(&chair());
    let image = state.image().expect("inline bakes are ready at once");

    assert_eq!(image.dimensions(), (SIZE, SIZE));
    assert_eq!(image.get_pixel(0, 0).0[3], 0);
    assert_eq!(image.get_pixel(SIZE / 2, SIZE / 2).0, [220, 0, 0, 255]);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 2);
}

#[test]
fn test_cached_icon_is_reused_until_piece_changes() {
    let renderer = Arc::new(SquareRenderer::default());
    let icons = provider(renderer.clone());
    let mut piece = chair();
    icons.icon_for(&piece);
    icons.icon_for(&piece);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 2);

    piece.color = Some(Color::rgb(0, 90, 200));
    icons.icon_for(&piece);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 4);
    assert_eq!(icons.len(), 1);
}

#[test]
fn test_background_bake_requests_repaint() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (gate_tx, gate_rx) = mpsc::channel();
    let renderer = Arc::new(SquareRenderer {
        renders: AtomicUsize::new(0),
        gate: Some(Mutex::new(gate_rx)),
    });
    let (repaint_tx, repaint_rx) = mpsc::channel();
    let repaint_tx = Mutex::new(repaint_tx);
    let icons = TopViewIconProvider::new(
        renderer,
        Arc::new(TokioSpawner::new(runtime.handle().clone())),
        Arc::new(ImageCache::new()),
        SIZE,
    )
    .with_repaint(Arc::new(move || {
        let _ = repaint_tx.lock().unwrap().send(());
    }));

    let piece = chair();
    assert!(matches!(icons.icon_for(&piece), IconState::Pending));
    // Still pending while the bake runs
    assert!(icons.icon_for(&piece).is_pending());

    gate_tx.send(()).unwrap();
    gate_tx.send(()).unwrap();
    repaint_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(icons.icon_for(&piece).image().is_some());
}

fn top_view_config() -> Config {
    let mut config = Config::default();
    config.plan.furniture_viewed_from_top = true;
    config
}

#[test]
fn test_view_draws_top_view_over_piece_footprint() {
    let mut model = PlanModel::new();
    model.furniture.push(chair());
    let renderer = Arc::new(SquareRenderer::default());
    let services = ViewServices {
        renderer: renderer.clone(),
        ..ViewServices::default()
    };
    let mut view = PlanView::new(Arc::new(model), &top_view_config(), services)
        .with_text_metrics(TextMetrics::approximate());

    let mut surface = RecordingSurface::new();
    view.paint(&mut surface, PaintMode::Export).unwrap();
    let dest = surface
        .ops()
        .iter()
        .find_map(|op| match op {
            DrawOp::Image { dest, .. } => Some(*dest),
            _ => None,
        })
        .expect("top view drawn");
    assert_eq!((dest.width(), dest.height()), (45.0, 50.0));
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 2);
}

#[test]
fn test_icon_events_rebake_and_clear() {
    let piece = chair();
    let id = piece.id;
    let mut model = PlanModel::new();
    model.furniture.push(piece);
    let renderer = Arc::new(SquareRenderer::default());
    let services = ViewServices {
        renderer: renderer.clone(),
        ..ViewServices::default()
    };
    let mut view = PlanView::new(Arc::new(model), &top_view_config(), services)
        .with_text_metrics(TextMetrics::approximate());
    let bus = PlanEventBus::new();
    let _subscription = view.attach(&bus);

    view.paint(&mut RecordingSurface::new(), PaintMode::Interactive)
        .unwrap();
    assert_eq!(view.icons().len(), 1);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 2);

    bus.publish(PlanEvent::Furniture {
        id,
        property: FurnitureProperty::ModelMirrored,
    })
    .unwrap();
    view.paint(&mut RecordingSurface::new(), PaintMode::Interactive)
        .unwrap();
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 4);

    bus.publish(PlanEvent::Preferences(PreferenceChange::FurnitureViewedFromTop))
        .unwrap();
    view.prepare();
    assert!(view.icons().is_empty());
}
