mod common;

use common::synthetic_surface::{checker_surface, step_surface, textured_surface, total_variation};
use depth_filter::{FilterController, ImageF32, SurfaceStore};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Run the depth smoother alone and return the smoothed surface.
fn smooth_depth(
    depth: ImageF32,
    radius: u32,
    sigma_s: f32,
    sigma_r: f32,
    iterations: u32,
) -> ImageF32 {
    let (w, h) = depth.dims();
    let mut surfaces = SurfaceStore::new();
    let handle = surfaces.insert(depth);
    let mut controller = FilterController::new(w, h).expect("controller");
    controller.set_depth_surface(handle);
    controller
        .set_bilateral_params(radius, sigma_s, sigma_r, iterations)
        .expect("params");
    controller.filter(&mut surfaces, false).expect("filter");
    surfaces.remove(handle).expect("depth surface")
}

/// Run smoothing plus outline detection and return the outline surface.
fn detect_outline(depth: ImageF32, outline: ImageF32, similarity: f32) -> ImageF32 {
    let (w, h) = depth.dims();
    let mut surfaces = SurfaceStore::new();
    let depth = surfaces.insert(depth);
    let outline = surfaces.insert(outline);
    let mut controller = FilterController::new(w, h).expect("controller");
    controller.set_depth_surface(depth);
    controller.set_outline_surface(outline);
    controller
        .set_bilateral_params(2, 1.0, 0.01, 1)
        .expect("depth params");
    controller
        .set_edge_params(3, 1.0, similarity)
        .expect("edge params");
    controller.filter(&mut surfaces, true).expect("filter");
    surfaces.remove(outline).expect("outline surface")
}

#[test]
fn zero_radius_leaves_depth_unchanged() {
    init_logging();
    let input = textured_surface(23, 17);
    for iterations in [1, 3] {
        let output = smooth_depth(input.clone(), 0, 2.0, 0.05, iterations);
        assert_eq!(output, input, "radius 0 changed depth at {iterations} iterations");
    }
}

#[test]
fn flat_depth_stays_exactly_flat() {
    init_logging();
    let output = smooth_depth(ImageF32::filled(40, 30, 500.0), 3, 2.0, 50.0, 2);
    assert!(
        output.data.iter().all(|&v| v == 500.0),
        "flat surface drifted"
    );
}

#[test]
fn strong_discontinuity_is_preserved() {
    init_logging();
    let input = step_surface(32, 12, 16, 100.0, 900.0);
    let output = smooth_depth(input.clone(), 4, 3.0, 10.0, 3);
    assert_eq!(output, input, "step edge was blurred");
}

#[test]
fn smoothing_does_not_increase_total_variation() {
    init_logging();
    for input in [
        step_surface(32, 8, 16, 0.0, 10.0),
        checker_surface(24, 24, 3, 0.0, 10.0),
    ] {
        let mut previous = total_variation(&input);
        for iterations in 1..=3 {
            let output = smooth_depth(input.clone(), 2, 1.5, 1.0e6, iterations);
            let tv = total_variation(&output);
            assert!(
                tv <= previous + 1e-3,
                "total variation grew at {iterations} iterations: {previous:.4} -> {tv:.4}"
            );
            previous = tv;
        }
    }

    let checker = checker_surface(24, 24, 3, 0.0, 10.0);
    let before = total_variation(&checker);
    let after = total_variation(&smooth_depth(checker, 2, 1.5, 1.0e6, 1));
    assert!(after < 0.5 * before, "checker barely smoothed: {before} -> {after}");
}

#[test]
fn corner_outlier_only_reaches_its_window() {
    init_logging();
    let radius = 2usize;
    let mut input = ImageF32::filled(16, 16, 500.0);
    input.set(0, 0, 900.0);
    let output = smooth_depth(input, radius as u32, 2.0, 1.0e6, 1);

    let corner = output.get(0, 0);
    assert!(corner > 500.0 && corner < 900.0, "corner={corner}");
    for y in 0..16 {
        for x in 0..16 {
            let v = output.get(x, y);
            if x.max(y) > radius {
                assert_eq!(v, 500.0, "pixel ({x},{y}) outside the window changed");
            } else if (x, y) != (0, 0) {
                assert!(v > 500.0 && v < 900.0, "pixel ({x},{y}) = {v}");
            }
        }
    }

    let uniform = smooth_depth(ImageF32::filled(9, 7, 500.0), 3, 2.0, 1.0e6, 2);
    assert_eq!(uniform.get(0, 0), 500.0);
    assert_eq!(uniform.get(8, 6), 500.0);
}

#[test]
fn outline_marks_the_step_and_nothing_far_from_it() {
    init_logging();
    let depth = step_surface(40, 10, 20, 0.2, 0.8);
    let outline = detect_outline(depth, ImageF32::new(40, 10), 0.3);
    for y in 0..10 {
        assert_eq!(outline.get(19, y), 1.0, "left of step not marked in row {y}");
        assert_eq!(outline.get(20, y), 1.0, "right of step not marked in row {y}");
        for x in (0..10).chain(31..40) {
            assert_eq!(outline.get(x, y), 0.0, "flat pixel ({x},{y}) marked");
        }
    }
}

#[test]
fn raw_outline_is_kept_under_detected_edges() {
    init_logging();
    let depth = step_surface(40, 10, 20, 0.2, 0.8);
    let mut raw = ImageF32::new(40, 10);
    raw.set(2, 2, 0.5);
    raw.set(20, 5, 3.0);
    let outline = detect_outline(depth, raw, 0.3);
    assert_eq!(outline.get(2, 2), 0.5);
    assert_eq!(outline.get(20, 5), 3.0);
    assert_eq!(outline.get(20, 4), 1.0);
}

#[test]
fn raising_similarity_never_adds_edges() {
    init_logging();
    let mut depth = textured_surface(36, 28);
    for y in 8..20 {
        for x in 10..26 {
            depth.set(x, y, depth.get(x, y) + 0.6);
        }
    }
    let thresholds = [0.0f32, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0];
    let masks: Vec<Vec<bool>> = thresholds
        .iter()
        .map(|&s| {
            detect_outline(depth.clone(), ImageF32::new(36, 28), s)
                .data
                .iter()
                .map(|&v| v > 0.0)
                .collect()
        })
        .collect();

    for (pair, window) in thresholds.windows(2).zip(masks.windows(2)) {
        let (looser, stricter) = (&window[0], &window[1]);
        for (i, (&a, &b)) in looser.iter().zip(stricter).enumerate() {
            assert!(
                a || !b,
                "pixel {i} marked at similarity {} but not at {}",
                pair[1],
                pair[0]
            );
        }
    }
    let count = |m: &Vec<bool>| m.iter().filter(|&&v| v).count();
    assert!(count(&masks[0]) > 0);
    assert_eq!(count(&masks[masks.len() - 1]), 0);
}

#[test]
fn repeated_intensity_range_is_idempotent() {
    init_logging();
    let depth = textured_surface(20, 14);
    let run = |repeats: usize| {
        let mut surfaces = SurfaceStore::new();
        let handle = surfaces.insert(depth.clone());
        let mut controller = FilterController::new(20, 14).expect("controller");
        controller.set_depth_surface(handle);
        for _ in 0..repeats {
            controller.set_intensity_range(1.0, 11.0).expect("range");
        }
        let sigma_r = controller.effective_params().expect("params").depth.sigma_r;
        controller.filter(&mut surfaces, false).expect("filter");
        (sigma_r, surfaces.remove(handle).expect("depth"))
    };

    let (once_sigma, once) = run(1);
    let (thrice_sigma, thrice) = run(3);
    let base = FilterController::new(20, 14).expect("controller").config().depth.sigma_r;
    assert_eq!(once_sigma, base * 10.0);
    assert_eq!(once_sigma, thrice_sigma);
    assert_eq!(once, thrice);
}
