//! Weighted aggregation with lazy pruning.

use anyhow::{ensure, Result};

use viewfinder_core::math::Real;
use viewfinder_core::scene::SceneOracle;

use crate::props::Property;
use crate::scratch::EvalContext;

/// Outcome of evaluating a candidate camera.
///
/// Only [`Eval::Valid`] carries a satisfaction and participates in
/// best-candidate updates; the other variants say *why* there is no
/// value. Serialized reports flatten these to the conventional `-1`
/// (pruned) and `-2` (out of domain) scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Eval {
    Valid(Real),
    /// The running upper bound fell below the lazy threshold.
    Pruned,
    /// The candidate's parameters are outside the problem domain.
    OutOfDomain,
}

impl Eval {
    pub fn value(self) -> Option<Real> {
        match self {
            Eval::Valid(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_valid(self) -> bool {
        matches!(self, Eval::Valid(_))
    }

    /// Flat score for reports: `-1` pruned, `-2` out of domain.
    pub fn score(self) -> Real {
        match self {
            Eval::Valid(v) => v,
            Eval::Pruned => -1.0,
            Eval::OutOfDomain => -2.0,
        }
    }
}

/// The problem objective: a normalized weighted sum of properties.
///
/// Weights are normalized to sum to 1 at construction, so the aggregate
/// stays in `[0, 1]` and partial sums bound the final value from above:
/// `acc + remaining_weight` can only shrink as evaluation proceeds.
/// Properties listed in increasing cost order make the bound bite before
/// the expensive tail runs; [`Objective::sorted_by_cost`] applies that
/// order, [`Objective::new`] preserves the caller's.
#[derive(Debug, Clone)]
pub struct Objective {
    props: Vec<Property>,
    weights: Vec<Real>,
}

impl Objective {
    pub fn new(props: Vec<Property>, weights: Vec<Real>) -> Result<Self> {
        ensure!(!props.is_empty(), "objective needs at least one property");
        ensure!(
            props.len() == weights.len(),
            "property count ({}) must match weight count ({})",
            props.len(),
            weights.len()
        );
        ensure!(
            weights.iter().all(|&w| w > 0.0),
            "weights must be positive"
        );
        let total: Real = weights.iter().sum();
        let weights = weights.iter().map(|w| w / total).collect();
        Ok(Self { props, weights })
    }

    /// Like [`Objective::new`], but orders properties cheapest-first.
    pub fn sorted_by_cost(props: Vec<Property>, weights: Vec<Real>) -> Result<Self> {
        ensure!(
            props.len() == weights.len(),
            "property count ({}) must match weight count ({})",
            props.len(),
            weights.len()
        );
        let mut pairs: Vec<(Property, Real)> = props.into_iter().zip(weights).collect();
        pairs.sort_by(|a, b| {
            a.0.cost()
                .partial_cmp(&b.0.cost())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let (props, weights) = pairs.into_iter().unzip();
        Self::new(props, weights)
    }

    pub fn props(&self) -> &[Property] {
        &self.props
    }

    pub fn weights(&self) -> &[Real] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Evaluate the weighted sum, giving up as soon as the upper bound
    /// drops below `lazy_threshold`.
    ///
    /// Passing `Real::NEG_INFINITY` disables pruning; pruning never
    /// changes a returned `Valid` value, only whether the tail was worth
    /// computing. The product of child in-screen ratios lands in the
    /// scratch as a diagnostic either way.
    pub fn evaluate<S: SceneOracle + ?Sized>(
        &self,
        ctx: &mut EvalContext<'_, S>,
        lazy_threshold: Real,
    ) -> Eval {
        let mut acc = 0.0;
        let mut remaining = 1.0;
        let mut ratio_product = 1.0;
        for (index, (prop, &weight)) in self.props.iter().zip(&self.weights).enumerate() {
            let s = prop.evaluate(index, ctx);
            acc += weight * s;
            remaining -= weight;
            ratio_product *= ctx.scratch.props[index].in_screen_ratio;
            if acc + remaining < lazy_threshold {
                ctx.scratch.combined_in_screen = ratio_product;
                return Eval::Pruned;
            }
        }
        ctx.scratch.combined_in_screen = ratio_product;
        Eval::Valid(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::PropertyKind;
    use viewfinder_core::spline::SatSpline;

    fn fov_prop(name: &str, xs: Vec<Real>, ys: Vec<Real>) -> Property {
        Property::new(
            name,
            PropertyKind::CameraFov,
            vec![],
            SatSpline::new(xs, ys).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn weights_normalize_to_one() {
        let props = vec![
            fov_prop("a", vec![0.0, 180.0], vec![1.0, 1.0]),
            fov_prop("b", vec![0.0, 180.0], vec![0.0, 1.0]),
            fov_prop("c", vec![0.0, 180.0], vec![1.0, 0.0]),
        ];
        let obj = Objective::new(props, vec![3.0, 5.0, 2.0]).unwrap();
        let sum: Real = obj.weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!((obj.weights()[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_construction() {
        assert!(Objective::new(vec![], vec![]).is_err());
        let p = fov_prop("a", vec![0.0, 180.0], vec![1.0, 1.0]);
        assert!(Objective::new(vec![p.clone()], vec![]).is_err());
        assert!(Objective::new(vec![p], vec![-1.0]).is_err());
    }

    #[test]
    fn sorted_by_cost_orders_cheapest_first() {
        let expensive = fov_prop("slow", vec![0.0, 180.0], vec![1.0, 1.0]).with_cost(9.0);
        let cheap = fov_prop("fast", vec![0.0, 180.0], vec![1.0, 1.0]).with_cost(1.0);
        let obj = Objective::sorted_by_cost(vec![expensive, cheap], vec![1.0, 1.0]).unwrap();
        assert_eq!(obj.props()[0].name(), "fast");
        assert_eq!(obj.props()[1].name(), "slow");
    }

    #[test]
    fn eval_scores_flatten_variants() {
        assert_eq!(Eval::Valid(0.3).score(), 0.3);
        assert_eq!(Eval::Pruned.score(), -1.0);
        assert_eq!(Eval::OutOfDomain.score(), -2.0);
        assert_eq!(Eval::Pruned.value(), None);
        assert!(Eval::Valid(0.0).is_valid());
    }
}
