//! Tests for detection against synthetic screens

use crate::coords::{Point, Rect, ScreenPoint, ScreenRegion};
use crate::error::BotError;
use crate::platform::{ReplayDesktop, WindowSpec};
use crate::template_matching::correlation::ScoreMap;
use crate::template_matching::matcher::{all_at_threshold, single_best};
use crate::template_matching::{
    ColorMode, DEFAULT_OVERLAP_THRESHOLD, Match, MatchConfig, MatchMode, Matcher, Template,
    ThresholdLadder, dedupe,
};
use image::{DynamicImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Sparse dot pattern; no shift other than zero lines up more than two dots.
const STONE_DOTS: [(u32, u32); 5] = [(1, 1), (6, 2), (3, 5), (5, 6), (2, 3)];

fn stone_template() -> Template {
    let mut img = RgbImage::new(8, 8);
    for (x, y) in STONE_DOTS {
        img.put_pixel(x, y, Rgb([255, 255, 255]));
    }
    Template::from_image("stone.png", DynamicImage::ImageRgb8(img)).unwrap()
}

fn stamp_stone(screen: &mut RgbaImage, at: (u32, u32), color: [u8; 3]) {
    for (x, y) in STONE_DOTS {
        screen.put_pixel(at.0 + x, at.1 + y, Rgba([color[0], color[1], color[2], 255]));
    }
}

fn desktop_with_stones(stones: &[(u32, u32)]) -> ReplayDesktop {
    let mut screen = RgbaImage::new(240, 160);
    for &at in stones {
        stamp_stone(&mut screen, at, [255, 255, 255]);
    }
    ReplayDesktop::new(
        screen,
        Point::ORIGIN,
        WindowSpec::covering("Game", Rect::new(0, 0, 240, 160)),
    )
}

/// Shaded background, `30 + x/2 + y/2`, no flat windows anywhere.
fn gradient_screen(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let v = (30 + x / 2 + y / 2) as u8;
        Rgba([v, v, v, 255])
    })
}

fn desktop_on_gradient(stones: &[(u32, u32)]) -> ReplayDesktop {
    let mut screen = gradient_screen(240, 160);
    for &at in stones {
        stamp_stone(&mut screen, at, [255, 255, 255]);
    }
    ReplayDesktop::new(
        screen,
        Point::ORIGIN,
        WindowSpec::covering("Game", Rect::new(0, 0, 240, 160)),
    )
}

fn checkerboard_template() -> Template {
    let img = RgbImage::from_fn(8, 8, |x, y| {
        let v = if (x + y) % 2 == 0 { 100 } else { 200 };
        Rgb([v, v, v])
    });
    Template::from_image("checker.png", DynamicImage::ImageRgb8(img)).unwrap()
}

fn full_region() -> ScreenRegion {
    ScreenRegion::new(0, 0, 240, 160)
}

#[test]
fn test_single_best_finds_stone_center() {
    let desktop = desktop_with_stones(&[(40, 30)]);
    let matcher = Matcher::new(MatchConfig::default());

    let found = matcher
        .locate(&desktop, &stone_template(), &full_region(), MatchMode::SingleBest)
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].center(), ScreenPoint::new(44, 34));
    assert_eq!((found[0].width, found[0].height), (8, 8));
    assert!(found[0].confidence > 0.99, "confidence {}", found[0].confidence);
}

#[test]
fn test_match_reported_in_screen_coordinates() {
    let desktop = desktop_with_stones(&[(40, 30)]);
    let matcher = Matcher::new(MatchConfig::default());
    let region = ScreenRegion::new(20, 10, 100, 100);

    let set = matcher
        .detect(&desktop, &stone_template(), &region, MatchMode::SingleBest)
        .unwrap();

    assert_eq!(set.best().unwrap().center(), ScreenPoint::new(44, 34));
}

#[test]
fn test_multi_match_finds_every_stone() {
    let desktop = desktop_with_stones(&[(150, 100), (20, 20)]);
    let matcher = Matcher::new(MatchConfig::default());

    let set = matcher
        .detect(&desktop, &stone_template(), &full_region(), MatchMode::MultiMatch)
        .unwrap();

    assert_eq!(set.len(), 2);
    let mut centers: Vec<ScreenPoint> = set.iter().map(|m| m.center()).collect();
    centers.sort_by_key(|p| p.0.x);
    assert_eq!(centers, vec![ScreenPoint::new(24, 24), ScreenPoint::new(154, 104)]);
    for pair in set.as_slice().windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
}

#[test]
fn test_empty_screen_yields_no_matches() {
    let desktop = desktop_with_stones(&[]);
    let matcher = Matcher::new(MatchConfig::default());

    for mode in [MatchMode::SingleBest, MatchMode::MultiMatch] {
        let set = matcher
            .detect(&desktop, &stone_template(), &full_region(), mode)
            .unwrap();
        assert!(set.is_empty(), "{mode:?} found {:?}", set);
    }
}

#[test]
fn test_gradient_without_stone_yields_no_matches() {
    let desktop = desktop_on_gradient(&[]);

    for color_mode in [ColorMode::Grayscale, ColorMode::Color] {
        let matcher = Matcher::new(MatchConfig {
            color_mode,
            ..MatchConfig::default()
        });
        for template in [stone_template(), checkerboard_template()] {
            for mode in [MatchMode::SingleBest, MatchMode::MultiMatch] {
                let set = matcher
                    .detect(&desktop, &template, &full_region(), mode)
                    .unwrap();
                assert!(
                    set.is_empty(),
                    "{color_mode:?}/{mode:?} found '{}' on a bare gradient: {:?}",
                    template.name(),
                    set
                );
            }
        }
    }
}

#[test]
fn test_stone_found_on_gradient() {
    let matcher = Matcher::new(MatchConfig::default());

    let single = matcher
        .detect(
            &desktop_on_gradient(&[(40, 30)]),
            &stone_template(),
            &full_region(),
            MatchMode::SingleBest,
        )
        .unwrap();
    let best = single.best().unwrap();
    assert_eq!(best.center(), ScreenPoint::new(44, 34));
    assert!(best.confidence > 0.95, "confidence {}", best.confidence);

    let multi = matcher
        .detect(
            &desktop_on_gradient(&[(150, 100), (20, 20)]),
            &stone_template(),
            &full_region(),
            MatchMode::MultiMatch,
        )
        .unwrap();
    let mut centers: Vec<ScreenPoint> = multi.iter().map(|m| m.center()).collect();
    centers.sort_by_key(|p| p.0.x);
    assert_eq!(centers, vec![ScreenPoint::new(24, 24), ScreenPoint::new(154, 104)]);
}

#[test]
fn test_region_off_screen_is_capture_error() {
    let desktop = desktop_with_stones(&[(40, 30)]);
    let matcher = Matcher::new(MatchConfig::default());
    let region = ScreenRegion::new(-500, -500, 100, 100);

    let err = matcher
        .detect(&desktop, &stone_template(), &region, MatchMode::SingleBest)
        .unwrap_err();
    assert!(matches!(err, BotError::Capture { .. }));
}

#[test]
fn test_template_larger_than_region_is_empty() {
    let desktop = desktop_with_stones(&[(40, 30)]);
    let matcher = Matcher::new(MatchConfig::default());
    let region = ScreenRegion::new(40, 30, 6, 6);

    let set = matcher
        .detect(&desktop, &stone_template(), &region, MatchMode::MultiMatch)
        .unwrap();
    assert!(set.is_empty());
}

#[test]
fn test_color_mode_detects_colored_stone() {
    let mut screen = RgbaImage::new(120, 80);
    stamp_stone(&mut screen, (60, 40), [200, 40, 40]);
    let desktop = ReplayDesktop::new(
        screen,
        Point::ORIGIN,
        WindowSpec::covering("Game", Rect::new(0, 0, 120, 80)),
    );

    let mut template_img = RgbImage::new(8, 8);
    for (x, y) in STONE_DOTS {
        template_img.put_pixel(x, y, Rgb([200, 40, 40]));
    }
    let template = Template::from_image("red.png", DynamicImage::ImageRgb8(template_img)).unwrap();

    let config = MatchConfig {
        color_mode: ColorMode::Color,
        ..MatchConfig::default()
    };
    let set = Matcher::new(config)
        .detect(&desktop, &template, &ScreenRegion::new(0, 0, 120, 80), MatchMode::SingleBest)
        .unwrap();
    assert_eq!(set.best().unwrap().center(), ScreenPoint::new(64, 44));
}

#[test]
fn test_single_best_from_score_map() {
    // 100x100 region, 20x20 template
    let mut scores = ScoreMap::from_pixel(81, 81, Luma([0.1]));
    scores.put_pixel(40, 50, Luma([0.62]));
    let origin = ScreenPoint::new(300, 200);

    let found = single_best(&scores, origin, 20, 20, 0.4).unwrap();
    assert_eq!(found, Match::new(350, 260, 20, 20, 0.62));

    scores.put_pixel(40, 50, Luma([0.3]));
    assert!(single_best(&scores, origin, 20, 20, 0.4).is_none());
}

#[test]
fn test_single_best_weak_peak_still_accepted() {
    let mut scores = ScoreMap::from_pixel(181, 181, Luma([0.05]));
    scores.put_pixel(90, 90, Luma([0.55]));

    let found = single_best(&scores, ScreenPoint::new(400, 400), 20, 20, 0.4).unwrap();
    assert_eq!(found, Match::new(500, 500, 20, 20, 0.55));
}

#[test]
fn test_ladder_stops_at_first_rung_with_hits() {
    let mut scores = ScoreMap::from_pixel(50, 50, Luma([0.2]));
    scores.put_pixel(5, 5, Luma([0.69]));
    scores.put_pixel(30, 30, Luma([0.665]));
    let origin = ScreenPoint::new(0, 0);

    let outcome = ThresholdLadder::default()
        .step_down(|t| all_at_threshold(&scores, origin, 10, 10, t));

    // 0.70 finds nothing, 0.68 finds only the 0.69 peak
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.found.len(), 1);
    assert_eq!(outcome.found[0].center(), ScreenPoint::new(10, 10));
    assert!((outcome.found[0].confidence - 0.69).abs() < 1e-6);
}

#[test]
fn test_ladder_below_floor_finds_nothing() {
    let mut scores = ScoreMap::from_pixel(50, 50, Luma([0.2]));
    scores.put_pixel(5, 5, Luma([0.64]));

    let outcome = ThresholdLadder::default()
        .step_down(|t| all_at_threshold(&scores, ScreenPoint::new(0, 0), 10, 10, t));
    assert!(outcome.found.is_empty());
    assert_eq!(outcome.attempts, 3);
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_returns_immediately_when_visible() {
    let desktop = desktop_with_stones(&[(40, 30)]);
    let matcher = Matcher::new(MatchConfig::default());
    let started = tokio::time::Instant::now();

    let set = matcher
        .wait_for(
            &desktop,
            &stone_template(),
            &full_region(),
            MatchMode::SingleBest,
            Duration::from_secs(30),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert!(set.is_some());
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_gives_up_after_timeout() {
    let desktop = desktop_with_stones(&[]);
    let matcher = Matcher::new(MatchConfig::default());
    let started = tokio::time::Instant::now();

    let set = matcher
        .wait_for(
            &desktop,
            &stone_template(),
            &full_region(),
            MatchMode::SingleBest,
            Duration::from_secs(5),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert!(set.is_none());
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert!(started.elapsed() < Duration::from_secs(7));
}

#[test]
fn test_dedupe_invariants_on_random_matches() {
    let mut rng = StdRng::seed_from_u64(0x5701);

    for _ in 0..50 {
        let raw: Vec<Match> = (0..rng.gen_range(0..40))
            .map(|_| {
                Match::new(
                    rng.gen_range(0..200),
                    rng.gen_range(0..200),
                    rng.gen_range(5..40),
                    rng.gen_range(5..40),
                    rng.gen_range(0.65..1.0),
                )
            })
            .collect();

        let set = dedupe(raw.clone(), DEFAULT_OVERLAP_THRESHOLD);
        let kept = set.as_slice();

        // The top raw match always survives, first one wins on ties
        let top = raw.iter().reduce(|best, m| {
            if m.confidence.total_cmp(&best.confidence).is_gt() { m } else { best }
        });
        assert_eq!(set.best(), top);

        // Ordered best first
        for pair in kept.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        // No two survivors overlap heavily
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                assert!(a.overlap_ratio(b) <= DEFAULT_OVERLAP_THRESHOLD);
            }
        }
        // Every survivor came from the input, every dropped one is covered
        for m in kept {
            assert!(raw.contains(m));
        }
        for m in raw.iter().filter(|m| !kept.contains(m)) {
            assert!(
                kept.iter().any(|k| k.confidence >= m.confidence
                    && m.overlap_ratio(k) > DEFAULT_OVERLAP_THRESHOLD),
                "{m} dropped without a covering match"
            );
        }
    }
}
