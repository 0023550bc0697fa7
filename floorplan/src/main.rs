use std::env;
use std::path::Path;
use std::process;
use std::sync::Arc;

use floorplan_core::{CanvasOptions, FloorPlan, PlanError, Style, build_scene_svg, compose, load_csv};

mod export;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: floorplan <plan.json> <data.csv> <output.png> [size_px] [style.json]");
        process::exit(2);
    }
    if let Err(e) = run(&args) {
        log::error!("{e}");
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), PlanError> {
    let plan_path = Path::new(&args[1]);
    let data_path = Path::new(&args[2]);
    let out_path = Path::new(&args[3]);
    let size_px: u32 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(3600);
    let style = match args.get(5) {
        Some(p) => Style::load(Path::new(p))?,
        None => Style::default(),
    };

    let plan = FloorPlan::load(plan_path)?;
    let records = load_csv(data_path)?;
    log::info!(
        "composing scene: {} room vertices, {} pipes, {} sprinklers",
        plan.room.vertices().len(),
        plan.pipes.len(),
        records.len()
    );
    let scene = compose(&plan, &records, &style);
    let opts = CanvasOptions {
        size_px,
        ..CanvasOptions::default()
    };
    let (svg, w_px, h_px) = build_scene_svg(&scene, &style, &opts);

    let mut opt = usvg::Options::default();
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    opt.fontdb = Arc::new(fontdb);
    let tree = usvg::Tree::from_str(&svg, &opt)
        .map_err(|e| PlanError::RenderFailed(format!("SVG parse error: {e}")))?;
    let mut pixmap = tiny_skia::Pixmap::new(w_px, h_px)
        .ok_or_else(|| PlanError::RenderFailed(format!("pixmap alloc failed ({w_px}x{h_px})")))?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);

    export::write_png_atomic(&pixmap, out_path)?;
    log::info!("wrote {} ({}x{} px)", out_path.display(), w_px, h_px);
    Ok(())
}
