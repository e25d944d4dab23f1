//! Frame a single cube at a quarter of the screen.
//!
//! Run with `cargo run --example cube_shot`.

use std::time::Duration;

use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};

use viewfinder::prelude::*;
use viewfinder::synthetic::BoxScene;

fn main() -> Result<()> {
    let mut scene = BoxScene::new();
    let cube = scene.add_box(Aabb::cube(Pt3::origin(), 2.0), 0);

    let mut rng = StdRng::seed_from_u64(7);
    let target = TargetBuilder::new("cube", vec![cube])
        .occluders(vec![cube])
        .build(&scene, &mut rng)?;

    // Prefer a quarter of the screen, seen slightly from above.
    let size = Property::new(
        "cube size",
        PropertyKind::Size { mode: SizeMode::Area },
        vec![0],
        SatSpline::new(vec![0.0, 0.25, 1.0], vec![0.0, 1.0, 0.0])?,
    )?;
    let elevation = Property::new(
        "slightly high angle",
        PropertyKind::Orientation {
            mode: OrientationMode::VerticalWorld,
        },
        vec![0],
        SatSpline::new(vec![0.0, 70.0, 90.0, 180.0], vec![0.0, 1.0, 0.3, 0.0])?,
    )?;
    let objective = Objective::sorted_by_cost(vec![size, elevation], vec![2.0, 1.0])?;

    let ten = Aabb::new(Pt3::new(-10.0, -10.0, -10.0), Pt3::new(10.0, 10.0, 10.0));
    let mut rig = CameraRig::new(Domain::look_at(ten, ten), objective, vec![target], 16.0 / 9.0)?;

    let mut solver = PsoSolver::new(PsoOptions::default())?;
    let request = SolveRequest::with_budget(Duration::from_millis(500), 0.98);
    let viewpoint = solver.solve(&scene, &mut rig, &request);

    if viewpoint.is_valid() {
        println!("satisfaction: {:.3}", viewpoint.objective());
        println!(
            "camera at ({:.2}, {:.2}, {:.2})",
            viewpoint.params[0], viewpoint.params[1], viewpoint.params[2]
        );
        let stats = solver.last_stats();
        println!(
            "{} evaluations, {} pruned, {} iterations",
            stats.evaluations, stats.pruned, stats.iterations
        );
    } else {
        println!("no valid viewpoint found in the budget");
    }
    Ok(())
}
