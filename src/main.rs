use anyhow::Context;
use floorkit::{
    init_logging, sample_plan, CancellationToken, Config, Exportable, PlanModel, PlanView,
    PrintRequest, Printable, ViewServices, BUILD_DATE, VERSION,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

/// Usage: `floorkit [plan.json] [output-dir]`
///
/// Exports the plan as `plan.svg` and its selection as `selection.png`.
fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging()?;
    tracing::info!("floorkit {} built {}", VERSION, BUILD_DATE);

    let mut args = std::env::args().skip(1);
    let model = match args.next() {
        Some(path) => {
            let content =
                std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
            PlanModel::from_json(&content)
                .with_context(|| format!("parsing {}", path))?
        }
        None => sample_plan(),
    };
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let config = Config::default_path()
        .and_then(|path| Config::load_or_default(&path))
        .unwrap_or_else(|e| {
            tracing::warn!("Using default configuration: {}", e);
            Config::default()
        });

    let mut view = PlanView::new(Arc::new(model), &config, ViewServices::default());

    let svg_path = out_dir.join("plan.svg");
    view.export_vector_to_file(&svg_path, &CancellationToken::new())?;
    tracing::info!("Wrote {}", svg_path.display());

    let png_path = out_dir.join("selection.png");
    match view.export_clipboard_image() {
        Ok(image) => {
            let file = File::create(&png_path)
                .with_context(|| format!("creating {}", png_path.display()))?;
            floorkit_plan::export::write_png(&image, BufWriter::new(file))?;
            tracing::info!("Wrote {}", png_path.display());
        }
        Err(e) if e.is_recoverable() => tracing::warn!("No selection image: {}", e),
        Err(e) => return Err(e.into()),
    }

    let pages = view.page_count(&PrintRequest::from_settings(&config.print));
    tracing::info!("Plan prints on {} page(s)", pages);

    Ok(())
}
