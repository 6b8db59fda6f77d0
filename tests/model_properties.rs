use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use laliga_elo::Outcome;
use laliga_elo::elo::{self, BASE_DRAW_RATE, DRAW_MIN};

const SAMPLES: usize = 2_000;

fn random_pair(rng: &mut StdRng) -> (f64, f64, f64) {
    (
        rng.gen_range(800.0..2400.0),
        rng.gen_range(800.0..2400.0),
        rng.gen_range(0.0..150.0),
    )
}

#[test]
fn probabilities_form_a_distribution() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..SAMPLES {
        let (r_home, r_away, adv) = random_pair(&mut rng);
        let p = elo::predict(r_home, r_away, adv);
        assert!((p.sum() - 1.0).abs() < 1e-9, "sum {} for {r_home}/{r_away}", p.sum());
        for v in [p.home, p.draw, p.away] {
            assert!(v > 0.0 && v < 1.0, "{v} out of (0,1) for {r_home}/{r_away}");
        }
    }
}

#[test]
fn even_sides_split_evenly() {
    for r in [1200.0, 1500.0, 1873.25] {
        let p = elo::predict(r, r, 0.0);
        assert_eq!(p.home, p.away);
        assert_eq!(p.draw, BASE_DRAW_RATE);
    }
}

#[test]
fn stronger_home_side_wins_more_often() {
    let r_away = 1500.0;
    let mut prev = elo::predict(1000.0, r_away, 60.0);
    let mut r_home = 1000.0;
    while r_home < 2000.0 {
        r_home += 10.0;
        let p = elo::predict(r_home, r_away, 60.0);
        assert!(p.home > prev.home, "p_home did not rise at {r_home}");
        assert!(p.away < prev.away, "p_away did not fall at {r_home}");
        prev = p;
    }
}

#[test]
fn draw_rate_never_grows_with_the_gap() {
    let mut prev = elo::draw_probability(0.0);
    for step in 1..=200 {
        let gap = step as f64 * 5.0;
        let d = elo::draw_probability(gap);
        assert!(d <= prev);
        assert_eq!(d, elo::draw_probability(-gap));
        prev = d;
    }
    for gap in [300.0, 450.0, 1000.0, 5000.0] {
        assert_eq!(elo::draw_probability(gap), DRAW_MIN);
    }
}

#[test]
fn updates_are_zero_sum() {
    let mut rng = StdRng::seed_from_u64(11);
    for i in 0..SAMPLES {
        let (r_home, r_away, adv) = random_pair(&mut rng);
        let outcome = Outcome::ALL[i % 3];
        let k = rng.gen_range(1.0..60.0);
        let (h, a) = elo::update(r_home, r_away, outcome, k, adv);
        let gained = h - r_home;
        let lost = a - r_away;
        assert!((gained + lost).abs() < 1e-9, "not zero-sum: {gained} vs {lost}");
    }
}

#[test]
fn winner_never_loses_points() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..SAMPLES {
        let (r_home, r_away, adv) = random_pair(&mut rng);
        let (h, a) = elo::update(r_home, r_away, Outcome::Home, 20.0, adv);
        assert!(h >= r_home && a <= r_away);
        let (h, a) = elo::update(r_home, r_away, Outcome::Away, 20.0, adv);
        assert!(h <= r_home && a >= r_away);
    }
}

#[test]
fn extreme_rating_gaps_stay_inside_the_unit_interval() {
    let mut gap = 100.0_f64;
    while gap < 1e308 / 10.0 {
        for diff in [gap, -gap] {
            let p = elo::predict(diff, 0.0, 0.0);
            for v in [p.home, p.draw, p.away] {
                assert!(v > 0.0 && v < 1.0, "{v} out of (0,1) at gap {diff}");
            }
            assert!((p.sum() - 1.0).abs() < 1e-9, "sum {} at gap {diff}", p.sum());
        }
        gap *= 10.0;
    }
}

#[test]
fn draw_floor_is_exact_from_the_clamp_point() {
    for gap in [260.0, 260.5, 275.0] {
        assert_eq!(elo::draw_probability(gap), DRAW_MIN);
        assert_eq!(elo::draw_probability(-gap), DRAW_MIN);
    }
}
