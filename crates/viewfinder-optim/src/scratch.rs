//! Per-evaluation scratch state.
//!
//! Evaluating one camera touches every property and potentially projects
//! every target. The results are memoized here for the duration of that
//! single evaluation, in arrays parallel to the rig's target and property
//! lists: targets and properties themselves stay immutable, so the same
//! problem definition could later be evaluated from several contexts.

use rand::rngs::StdRng;

use viewfinder_core::math::Real;
use viewfinder_core::scene::SceneOracle;
use viewfinder_core::target::{Target, TargetScratch};
use viewfinder_core::ViewCamera;

/// Memoized result of one property within one evaluation.
#[derive(Debug, Clone, Default)]
pub struct PropScratch {
    pub evaluated: bool,
    pub satisfaction: Real,
    pub in_screen_ratio: Real,
}

/// Scratch arrays for one evaluation pass, reused across evaluations.
#[derive(Debug, Default)]
pub struct ScratchContext {
    pub targets: Vec<TargetScratch>,
    pub props: Vec<PropScratch>,
    /// Product of property in-screen ratios for the last evaluation.
    pub combined_in_screen: Real,
    /// Running count of property evaluations, across evaluations.
    /// Not cleared by [`ScratchContext::reset`]; this is how callers
    /// observe what lazy pruning saved.
    pub prop_evaluations: u64,
}

impl ScratchContext {
    pub fn new(num_targets: usize, num_props: usize) -> Self {
        Self {
            targets: (0..num_targets).map(|_| TargetScratch::new()).collect(),
            props: vec![PropScratch::default(); num_props],
            combined_in_screen: 0.0,
            prop_evaluations: 0,
        }
    }

    /// Forget the previous camera's results (flags only; buffers and the
    /// evaluation counter survive).
    pub fn reset(&mut self) {
        for t in &mut self.targets {
            t.reset();
        }
        for p in &mut self.props {
            p.evaluated = false;
            p.satisfaction = 0.0;
            p.in_screen_ratio = 0.0;
        }
        self.combined_in_screen = 0.0;
    }
}

/// Everything a property needs to measure itself against one camera.
pub struct EvalContext<'a, S: SceneOracle + ?Sized> {
    pub scene: &'a S,
    pub camera: &'a ViewCamera,
    pub targets: &'a [Target],
    pub scratch: &'a mut ScratchContext,
    pub rng: &'a mut StdRng,
}

impl<S: SceneOracle + ?Sized> EvalContext<'_, S> {
    /// Project target `t` unless it already was during this evaluation.
    pub fn ensure_rendered(&mut self, t: usize) {
        if !self.scratch.targets[t].rendered {
            self.targets[t].render(self.camera, &mut self.scratch.targets[t]);
        }
    }
}
