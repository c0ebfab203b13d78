use depth_filter::ImageF32;

/// Vertical step: columns `< split` hold `low`, the rest `high`.
pub fn step_surface(width: usize, height: usize, split: usize, low: f32, high: f32) -> ImageF32 {
    assert!(width > 0 && height > 0, "surface dimensions must be positive");
    let mut img = ImageF32::filled(width, height, low);
    for y in 0..height {
        for x in split.min(width)..width {
            img.set(x, y, high);
        }
    }
    img
}

/// Checkerboard of `cell`-sized squares alternating between `a` and `b`.
pub fn checker_surface(width: usize, height: usize, cell: usize, a: f32, b: f32) -> ImageF32 {
    assert!(cell > 0, "cell size must be positive");
    let mut img = ImageF32::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let v = if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b };
            img.set(x, y, v);
        }
    }
    img
}

/// Deterministic pseudo-random ramp used where a textured surface is needed.
pub fn textured_surface(width: usize, height: usize) -> ImageF32 {
    let mut img = ImageF32::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let noise = ((x * 31 + y * 17) % 7) as f32 * 0.01;
            img.set(x, y, 0.2 + 0.01 * x as f32 + noise);
        }
    }
    img
}

/// Sum of absolute neighbour differences along both axes, in f64.
pub fn total_variation(img: &ImageF32) -> f64 {
    let mut tv = 0.0f64;
    for y in 0..img.h {
        for x in 0..img.w {
            let v = img.get(x, y) as f64;
            if x + 1 < img.w {
                tv += (img.get(x + 1, y) as f64 - v).abs();
            }
            if y + 1 < img.h {
                tv += (img.get(x, y + 1) as f64 - v).abs();
            }
        }
    }
    tv
}
