//! Multiscale hierarchy diagnostic report.
//!
//! Answers three questions about the band-limited refinement scheme:
//!
//! 1. Per-level statistics: do refined levels carry the expected mix of
//!    inherited coarse structure and fresh band power?
//! 2. Single-level covariance: does the Monte-Carlo diagonal converge to
//!    the analytic per-sample variance?
//! 3. Consistency: how close is the finest level of a refined hierarchy to
//!    the matching window of a single-level run at the equivalent
//!    resolution?
//!
//! Run: `cargo run --example hierarchy_report --release`

use multiscale::{ConstantSpectrum, MultiscaleGaussian};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ─── small statistics helpers ────────────────────────────────────────────────

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn std_dev(xs: &[f64]) -> f64 {
    let m = mean(xs);
    (xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64).sqrt()
}

fn mean_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f64>() / a.len() as f64
}

// ─── 1. hierarchy realization ────────────────────────────────────────────────

fn report_realization() {
    println!("══ 1. Hierarchy realization ═════════════════════════════════════════");
    let size = 256;
    let n_refine = 3;
    let g = MultiscaleGaussian::new(ConstantSpectrum, n_refine, size).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let fields = g.realize(&mut rng);
    let xs = g.coordinates();

    println!("size={size}, n_refine={n_refine}, seed=1");
    println!("{:<7} {:>10} {:>10} {:>12} {:>12}", "Level", "Mean", "Std", "x spacing", "x max");
    for (lv, field) in fields.iter().enumerate() {
        let spacing = xs[lv][1] - xs[lv][0];
        println!(
            "L{:<6} {:>10.4} {:>10.4} {:>12.6} {:>12.4}",
            lv,
            mean(field),
            std_dev(field),
            spacing,
            xs[lv].last().unwrap(),
        );
    }
    println!();
}

// ─── 2. covariance convergence ───────────────────────────────────────────────

fn report_covariance_convergence() {
    println!("══ 2. Single-level covariance convergence ═══════════════════════════");
    let size = 64;
    let g = MultiscaleGaussian::new(ConstantSpectrum, 0, size).unwrap();

    println!("size={size}, n_refine=0, unit spectrum; theory: diag → 0.5");
    println!("{:>9} {:>14} {:>12}", "Trials", "Mean diag", "Rel err");
    for &n_trials in &[250usize, 1000, 4000] {
        let mut rng = StdRng::seed_from_u64(7);
        let cov = g.level_covariance(0, n_trials, &mut rng);
        let d = mean(&cov.diagonal());
        println!(
            "{:>9} {:>14.5} {:>11.2}%",
            n_trials,
            d,
            (d - 0.5).abs() / 0.5 * 100.0
        );
    }
    println!();
}

// ─── 3. refined vs single-level consistency ──────────────────────────────────

fn report_refinement_consistency() {
    println!("══ 3. Refined hierarchy vs equivalent single level ══════════════════");
    let base_size = 32;
    let n_refine = 2;
    let n_trials = 2000;

    // Finest level of the refined hierarchy.
    let refined = MultiscaleGaussian::new(ConstantSpectrum, n_refine, base_size).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let cv_refined = refined.level_covariance(n_refine, n_trials, &mut rng);

    // Single level at the equivalent resolution; compare the window that
    // overlaps the refined region.
    let full_size = base_size << n_refine;
    let flat = MultiscaleGaussian::new(ConstantSpectrum, 0, full_size).unwrap();
    let mut rng = StdRng::seed_from_u64(43);
    let cv_flat = flat.level_covariance(0, n_trials, &mut rng);

    let window_refined = cv_refined.block(0, 0, base_size);
    let window_flat = cv_flat.block(0, 0, base_size);

    let diag_refined: Vec<f64> = (0..base_size)
        .map(|i| window_refined[i * base_size + i])
        .collect();
    let diag_flat: Vec<f64> = (0..base_size)
        .map(|i| window_flat[i * base_size + i])
        .collect();

    println!("refined: size={base_size}, n_refine={n_refine}; flat: size={full_size}; {n_trials} trials");
    println!("  mean diag, finest refined level: {:.5}", mean(&diag_refined));
    println!("  mean diag, flat window:          {:.5}", mean(&diag_flat));
    println!("  mean |diff| over the window:     {:.5}", mean_abs_diff(&window_refined, &window_flat));
    println!();
    println!("The refined level re-injects coarse structure through the 1/3–2/3");
    println!("upsampling rather than through shared Fourier modes, so the two");
    println!("windows agree in scale but not entry for entry.");
    println!();
}

// ─── 4. cross-covariance block structure ─────────────────────────────────────

fn report_block_structure() {
    println!("══ 4. Cross-covariance block structure ══════════════════════════════");
    let size = 32;
    let n_refine = 2;
    let n_trials = 1000;
    let g = MultiscaleGaussian::new(ConstantSpectrum, n_refine, size).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let cov = g.cross_covariances(n_trials, &mut rng);

    println!("size={size}, n_refine={n_refine}, {n_trials} trials; mean |entry| per block");
    print!("{:<6}", "");
    for l2 in 0..=n_refine {
        print!("{:>10}", format!("L{l2}"));
    }
    println!();
    for l1 in 0..=n_refine {
        print!("L{l1:<5}");
        for l2 in 0..=n_refine {
            let b = cov.block(l1 * size, l2 * size, size);
            print!("{:>10.4}", b.iter().map(|v| v.abs()).sum::<f64>() / b.len() as f64);
        }
        println!();
    }
    println!();
    println!("Coupling decays away from the diagonal: each level shares upsampled");
    println!("structure with its parent, none of its fresh band with grandparents.");
}

fn main() {
    report_realization();
    report_covariance_convergence();
    report_refinement_consistency();
    report_block_structure();
}
