//! Finite-difference engines for the multi-factor models.

use ql_instruments::{OptionType, VanillaOption};
use ql_math::normal_cdf;
use ql_pricingengines::{
    black_scholes_merton, FdBatesVanillaEngine, FdCirVanillaEngine, FdExtOUJumpVanillaEngine,
    FdHestonHullWhiteVanillaEngine, FdHestonVanillaEngine, MEAN_VARIANCE_DELTA,
};
use ql_processes::{
    black_scholes_merton_process, BatesProcess, ExtOUWithJumpsProcess, ExtendedOrnsteinUhlenbeckProcess,
    HestonProcess, HullWhiteProcess, SquareRootProcess,
};
use ql_quotes::SimpleQuote;
use ql_termstructures::{BlackConstantVol, FlatForward};
use std::sync::Arc;

fn heston(sigma: f64, rho: f64) -> HestonProcess {
    HestonProcess::new(
        Arc::new(FlatForward::new(0.05)),
        Arc::new(FlatForward::new(0.0)),
        Arc::new(SimpleQuote::new(100.0)),
        0.04,
        1.5,
        0.04,
        sigma,
        rho,
    )
    .unwrap()
}

fn european(option_type: OptionType) -> VanillaOption {
    VanillaOption::european(option_type, 100.0, 1.0).unwrap()
}

// ─── Heston ───────────────────────────────────────────────────────────────────

#[test]
fn test_heston_low_vol_of_vol_is_black_scholes() {
    let engine = FdHestonVanillaEngine::new(Arc::new(heston(0.1, 0.0)));
    let results = european(OptionType::Call).price(&engine).unwrap();
    let (npv, delta, ..) = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.2, 1.0);
    assert!((results.value - npv).abs() < 0.15, "calculated {}, expected {npv}", results.value);
    assert!((results.delta.unwrap() - delta).abs() < 2e-2);
    let mv_delta = results.additional_results[MEAN_VARIANCE_DELTA];
    assert!((mv_delta - results.delta.unwrap()).abs() < 1e-12);
}

#[test]
fn test_heston_put_call_parity() {
    let engine = FdHestonVanillaEngine::new(Arc::new(heston(0.3, -0.7)));
    let call = european(OptionType::Call).price(&engine).unwrap().value;
    let put = european(OptionType::Put).price(&engine).unwrap().value;
    let forward = 100.0 - 100.0 * (-0.05_f64).exp();
    assert!((call - put - forward).abs() < 5e-2, "call {call}, put {put}");
}

#[test]
fn test_heston_american_put_exceeds_european() {
    let engine = FdHestonVanillaEngine::new(Arc::new(heston(0.3, -0.7))).with_grid(100, 100, 30);
    let american = VanillaOption::american(OptionType::Put, 100.0, 1.0)
        .unwrap()
        .price(&engine)
        .unwrap()
        .value;
    let european = european(OptionType::Put).price(&engine).unwrap().value;
    assert!(american > european + 0.1, "american {american}, european {european}");
}

// ─── Bates ────────────────────────────────────────────────────────────────────

#[test]
fn test_bates_without_jumps_is_heston() {
    let bates = Arc::new(BatesProcess::new(heston(0.3, -0.5), 0.0, -0.1, 0.2).unwrap());
    let grid = (50, 60, 25);
    let bates_value = european(OptionType::Call)
        .price(&FdBatesVanillaEngine::new(bates).with_grid(grid.0, grid.1, grid.2))
        .unwrap()
        .value;
    let heston_value = european(OptionType::Call)
        .price(&FdHestonVanillaEngine::new(Arc::new(heston(0.3, -0.5))).with_grid(grid.0, grid.1, grid.2))
        .unwrap()
        .value;
    assert!((bates_value - heston_value).abs() < 1e-6);
}

#[test]
fn test_jumps_raise_the_at_the_money_call() {
    let grid = (50, 60, 25);
    let with_jumps = Arc::new(BatesProcess::new(heston(0.3, -0.5), 0.5, -0.1, 0.2).unwrap());
    let jumpy = european(OptionType::Call)
        .price(&FdBatesVanillaEngine::new(with_jumps).with_grid(grid.0, grid.1, grid.2))
        .unwrap()
        .value;
    let plain = european(OptionType::Call)
        .price(&FdHestonVanillaEngine::new(Arc::new(heston(0.3, -0.5))).with_grid(grid.0, grid.1, grid.2))
        .unwrap()
        .value;
    assert!(jumpy > plain, "with jumps {jumpy}, without {plain}");
}

// ─── CIR short rate ───────────────────────────────────────────────────────────

#[test]
fn test_cir_with_a_quiet_rate_is_black_scholes() {
    let bs = Arc::new(black_scholes_merton_process(
        Arc::new(SimpleQuote::new(100.0)),
        Arc::new(FlatForward::new(0.0)),
        Arc::new(FlatForward::new(0.05)),
        Arc::new(BlackConstantVol::new(0.2)),
    ));
    let cir = Arc::new(SquareRootProcess::new(0.5, 0.05, 0.01, 0.05).unwrap());
    let engine = FdCirVanillaEngine::new(bs, cir, 0.0).unwrap();
    let value = european(OptionType::Call).price(&engine).unwrap().value;
    assert!((value - 10.4506).abs() < 0.15, "calculated {value}");
}

#[test]
fn test_cir_rejects_bad_correlation() {
    let bs = Arc::new(black_scholes_merton_process(
        Arc::new(SimpleQuote::new(100.0)),
        Arc::new(FlatForward::new(0.0)),
        Arc::new(FlatForward::new(0.05)),
        Arc::new(BlackConstantVol::new(0.2)),
    ));
    let cir = Arc::new(SquareRootProcess::new(0.5, 0.05, 0.01, 0.05).unwrap());
    assert!(FdCirVanillaEngine::new(bs, cir, 1.5).is_err());
}

// ─── Exponential OU with jumps ────────────────────────────────────────────────

#[test]
fn test_ou_with_negligible_jumps_is_lognormal() {
    let (a, sigma, t, r) = (1.0, 0.3, 1.0, 0.05);
    let level = 100.0_f64.ln();
    let ou = Arc::new(
        ExtendedOrnsteinUhlenbeckProcess::new(a, sigma, level, Arc::new(move |_t: f64| level)).unwrap(),
    );
    let process = Arc::new(ExtOUWithJumpsProcess::new(ou, 0.0, 5.0, 1.0, 1000.0).unwrap());
    let engine = FdExtOUJumpVanillaEngine::new(process, Arc::new(FlatForward::new(r)));
    let value = european(OptionType::Call).price(&engine).unwrap().value;

    let variance = sigma * sigma * (1.0 - (-2.0 * a * t).exp()) / (2.0 * a);
    let forward = (level + 0.5 * variance).exp();
    let std_dev = variance.sqrt();
    let d1 = ((forward / 100.0).ln() + 0.5 * variance) / std_dev;
    let expected = (-r * t).exp() * (forward * normal_cdf(d1) - 100.0 * normal_cdf(d1 - std_dev));
    assert!((value - expected).abs() < 0.15, "calculated {value}, expected {expected}");
}

// ─── Heston-Hull-White ────────────────────────────────────────────────────────

#[test]
fn test_heston_hull_white_with_a_quiet_rate_is_heston() {
    let hw = Arc::new(HullWhiteProcess::new(Arc::new(FlatForward::new(0.05)), 0.1, 0.001).unwrap());
    let engine = FdHestonHullWhiteVanillaEngine::new(Arc::new(heston(0.3, -0.5)), hw, 0.0)
        .unwrap()
        .with_grid(50, 100, 40, 11);
    let results = european(OptionType::Call).price(&engine).unwrap();
    let heston_value = european(OptionType::Call)
        .price(&FdHestonVanillaEngine::new(Arc::new(heston(0.3, -0.5))).with_grid(50, 100, 40))
        .unwrap()
        .value;
    assert!(
        (results.value - heston_value).abs() < 5e-2,
        "calculated {}, heston {heston_value}",
        results.value
    );
    assert!(results.delta.unwrap() > 0.0 && results.delta.unwrap() < 1.0);
}

#[test]
fn test_heston_hull_white_rejects_inconsistent_correlations() {
    let hw = Arc::new(HullWhiteProcess::new(Arc::new(FlatForward::new(0.05)), 0.1, 0.01).unwrap());
    assert!(FdHestonHullWhiteVanillaEngine::new(Arc::new(heston(0.3, -0.9)), hw, 0.5).is_err());
}
