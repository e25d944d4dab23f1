//! A two-subject shot from JSON configuration.
//!
//! Both cubes want screen presence and visibility, and the hero should
//! sit left of the companion in frame. Run with
//! `cargo run --example two_shot`.

use anyhow::Result;

use viewfinder::pipeline::{
    BoxConfig, DomainConfig, PlacementConfig, ProblemConfig, PropertyConfig, PropertyKindConfig,
    PsoConfig, SearchConfig, SizeModeConfig, SplineConfig, TargetConfig,
};
use viewfinder::prelude::*;
use viewfinder::synthetic::BoxScene;

fn main() -> Result<()> {
    let mut scene = BoxScene::new();
    let hero = scene.add_box(Aabb::cube(Pt3::new(-1.0, 0.0, 0.0), 1.5), 0);
    let companion = scene.add_box(Aabb::cube(Pt3::new(1.5, 0.0, 1.0), 1.0), 0);

    let target = |name: &str, id| TargetConfig {
        name: name.into(),
        size_sources: vec![id],
        occluders: vec![id],
        frame_object: None,
        n_rays: None,
        max_points: None,
        visibility_method: None,
    };

    let size = |name: &str, of: &str, peak| PropertyConfig {
        name: name.into(),
        targets: vec![of.into()],
        weight: 1.0,
        spline: SplineConfig::peak(0.0, peak, 1.0),
        kind: PropertyKindConfig::Size {
            mode: SizeModeConfig::Area,
        },
        cost: None,
    };

    let problem = ProblemConfig {
        targets: vec![target("hero", hero), target("companion", companion)],
        properties: vec![
            size("hero size", "hero", 0.15),
            size("companion size", "companion", 0.08),
            PropertyConfig {
                name: "hero on the left".into(),
                targets: vec!["hero".into(), "companion".into()],
                weight: 1.0,
                spline: SplineConfig {
                    xs: vec![0.0, 1.0],
                    ys: vec![0.0, 1.0],
                },
                kind: PropertyKindConfig::RelativePosition {
                    placement: PlacementConfig::Left,
                },
                cost: None,
            },
            PropertyConfig {
                name: "hero visible".into(),
                targets: vec!["hero".into()],
                weight: 2.0,
                spline: SplineConfig {
                    xs: vec![0.0, 1.0],
                    ys: vec![1.0, 0.0],
                },
                kind: PropertyKindConfig::Occlusion {
                    double_sided: false,
                    random_rays: false,
                },
                cost: None,
            },
        ],
        domain: DomainConfig::LookAt {
            position: BoxConfig {
                min: [-12.0, -2.0, -12.0],
                max: [12.0, 6.0, 12.0],
            },
            look_at: BoxConfig {
                min: [-4.0, -2.0, -4.0],
                max: [4.0, 2.0, 4.0],
            },
            roll_deg: (0.0, 0.0),
            vfov_deg: (50.0, 70.0),
        },
        clearance: None,
        viewport_aspect: 16.0 / 9.0,
    };

    let search = SearchConfig {
        time_limit_ms: 800,
        sat_threshold: 0.95,
        pso: PsoConfig {
            num_candidates: Some(64),
            seed: Some(11),
            ..PsoConfig::default()
        },
    };

    let report = run_viewpoint_search(&scene, &problem, &search)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
