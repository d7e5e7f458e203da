/// Distribution samplers built on a caller-supplied `Rng`.
use rand::Rng;
use std::f64::consts::PI;

/// Gaussian sample via Box-Muller
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    // Avoid ln(0)
    let u1: f64 = rng.gen::<f64>().max(1e-12);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std_dev * z
}

/// Beta(2, 2) sample. The median of three independent uniforms is exactly
/// Beta(2, 2) distributed.
pub fn beta_2_2<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let mut draws = [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()];
    draws.sort_by(|a, b| a.total_cmp(b));
    draws[1]
}

/// Index drawn proportionally to `weights`; `None` when no weight is positive
pub fn weighted_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let mut spin = rng.gen::<f64>() * total;
    let mut last_positive = None;
    for (i, w) in weights.iter().enumerate() {
        let w = w.max(0.0);
        if w <= 0.0 {
            continue;
        }
        last_positive = Some(i);
        spin -= w;
        if spin <= 0.0 {
            return Some(i);
        }
    }

    // Float drift fallback
    last_positive
}
