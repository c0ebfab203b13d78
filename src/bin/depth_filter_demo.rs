use depth_filter::config::{load_tool_config, FilterToolConfig};
use depth_filter::image::io::{load_grayscale_f32, save_grayscale_f32, write_json_file};
use depth_filter::{FilterController, FilterReport, ImageF32, SurfaceStore};
use nalgebra::Matrix4;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_tool_config(Path::new(&config_path))?;

    let depth = load_grayscale_f32(&config.input.depth, config.input.depth_scale)?;
    let (width, height) = depth.dims();
    let outline = match &config.input.outline {
        Some(path) => load_grayscale_f32(path, 1.0)?,
        None => ImageF32::new(width, height),
    };
    let thickness = config
        .input
        .thickness
        .as_ref()
        .map(|path| load_grayscale_f32(path, config.input.thickness_scale))
        .transpose()?;

    let filter_config = config.filter.to_config().map_err(|e| e.to_string())?;
    let mut controller =
        FilterController::with_config(width, height, filter_config).map_err(|e| e.to_string())?;
    apply_camera(&mut controller, &config, width, height)?;

    let mut surfaces = SurfaceStore::new();
    let depth_handle = surfaces.insert(depth);
    let outline_handle = surfaces.insert(outline);
    controller.set_depth_surface(depth_handle);
    controller.set_outline_surface(outline_handle);
    let thickness_handle = thickness.map(|t| {
        let handle = surfaces.insert(t);
        controller.set_thickness_surface(handle);
        handle
    });

    let render_outline = config.filter.render_outline;
    let report = match thickness_handle {
        Some(_) => controller.filter_frame(&mut surfaces, render_outline),
        None => controller.filter(&mut surfaces, render_outline),
    }
    .map_err(|e| e.to_string())?;

    let smoothed = surfaces
        .get(depth_handle)
        .ok_or("Depth surface disappeared")?;
    save_grayscale_f32(
        smoothed,
        &config.output.depth,
        0.0,
        config.input.depth_scale,
    )?;
    println!("Saved smoothed depth to {}", config.output.depth.display());

    if let (true, Some(path)) = (render_outline, &config.output.outline) {
        let outline = surfaces
            .get(outline_handle)
            .ok_or("Outline surface disappeared")?;
        save_grayscale_f32(outline, path, 0.0, 1.0)?;
        println!("Saved outline to {}", path.display());
    }
    if let (Some(handle), Some(path)) = (thickness_handle, &config.output.thickness) {
        let thickness = surfaces.get(handle).ok_or("Thickness surface disappeared")?;
        save_grayscale_f32(thickness, path, 0.0, config.input.thickness_scale)?;
        println!("Saved smoothed thickness to {}", path.display());
    }
    if let Some(path) = &config.output.report_json {
        write_json_file(path, &report)?;
        println!("Saved report to {}", path.display());
    }
    print_summary(&report);
    Ok(())
}

fn apply_camera(
    controller: &mut FilterController,
    config: &FilterToolConfig,
    width: usize,
    height: usize,
) -> Result<(), String> {
    let Some(camera) = &config.camera else {
        return Ok(());
    };
    let aspect = width as f32 / height as f32;
    let projection =
        Matrix4::new_perspective(aspect, camera.fovy_deg.to_radians(), camera.near, camera.far);
    controller
        .set_projection(projection)
        .map_err(|e| e.to_string())?;
    controller
        .set_intensity_range(camera.near, camera.far)
        .map_err(|e| e.to_string())
}

fn print_summary(report: &FilterReport) {
    for stage in &report.timings.stages {
        println!("  {:<10} {:>8.3} ms", stage.label, stage.elapsed_ms);
    }
    if let Some(outline) = &report.outline {
        println!("  outline pixels: {}", outline.edge_pixels);
    }
    println!("  total      {:>8.3} ms", report.timings.total_ms);
}

fn usage() -> String {
    "Usage: depth_filter_demo <config.json>".to_string()
}
