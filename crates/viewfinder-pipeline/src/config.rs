//! Serde-friendly problem and search configuration.
//!
//! These types mirror the constructor arguments of `viewfinder-core` and
//! `viewfinder-optim` in plain-data form, so whole problems can live in
//! JSON next to the scenes they shoot. Conversion happens in
//! [`crate::build_problem`]; targets are referenced by name here and
//! resolved to indices there.

use serde::{Deserialize, Serialize};

use viewfinder_core::math::{Aabb, Pt2, Pt3, Real, Rect, UnitQuat};
use viewfinder_core::scene::ObjectId;
use viewfinder_core::target::{SizeMode, VisibilityMethod};
use viewfinder_optim::props::{OrientationMode, Placement};
use viewfinder_optim::PsoOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplineConfig {
    pub xs: Vec<Real>,
    pub ys: Vec<Real>,
}

impl SplineConfig {
    pub fn peak(x_lo: Real, x_peak: Real, x_hi: Real) -> Self {
        Self {
            xs: vec![x_lo, x_peak, x_hi],
            ys: vec![0.0, 1.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum VisibilityMethodConfig {
    Random,
    UniformInBb,
    OnMesh,
}

impl VisibilityMethodConfig {
    pub fn to_method(self) -> VisibilityMethod {
        match self {
            VisibilityMethodConfig::Random => VisibilityMethod::Random,
            VisibilityMethodConfig::UniformInBb => VisibilityMethod::UniformInBb,
            VisibilityMethodConfig::OnMesh => VisibilityMethod::OnMesh,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    pub size_sources: Vec<ObjectId>,
    #[serde(default)]
    pub occluders: Vec<ObjectId>,
    #[serde(default)]
    pub frame_object: Option<ObjectId>,
    #[serde(default)]
    pub n_rays: Option<usize>,
    #[serde(default)]
    pub max_points: Option<usize>,
    #[serde(default)]
    pub visibility_method: Option<VisibilityMethodConfig>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum SizeModeConfig {
    Area,
    Width,
    Height,
}

impl SizeModeConfig {
    pub fn to_mode(self) -> SizeMode {
        match self {
            SizeModeConfig::Area => SizeMode::Area,
            SizeModeConfig::Width => SizeMode::Width,
            SizeModeConfig::Height => SizeMode::Height,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OrientationModeConfig {
    HorizontalLocal,
    VerticalLocal,
    VerticalWorld,
}

impl OrientationModeConfig {
    pub fn to_mode(self) -> OrientationMode {
        match self {
            OrientationModeConfig::HorizontalLocal => OrientationMode::HorizontalLocal,
            OrientationModeConfig::VerticalLocal => OrientationMode::VerticalLocal,
            OrientationModeConfig::VerticalWorld => OrientationMode::VerticalWorld,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PlacementConfig {
    Left,
    Right,
    Above,
    Below,
}

impl PlacementConfig {
    pub fn to_placement(self) -> Placement {
        match self {
            PlacementConfig::Left => Placement::Left,
            PlacementConfig::Right => Placement::Right,
            PlacementConfig::Above => Placement::Above,
            PlacementConfig::Below => Placement::Below,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RectConfig {
    pub min: [Real; 2],
    pub max: [Real; 2],
}

impl RectConfig {
    pub fn to_rect(self) -> Rect {
        Rect::new(
            Pt2::new(self.min[0], self.min[1]),
            Pt2::new(self.max[0], self.max[1]),
        )
    }
}

/// Property payload in config form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PropertyKindConfig {
    Size {
        mode: SizeModeConfig,
    },
    Occlusion {
        #[serde(default)]
        double_sided: bool,
        #[serde(default)]
        random_rays: bool,
    },
    Orientation {
        mode: OrientationModeConfig,
    },
    Framing {
        rect: RectConfig,
    },
    RelativePosition {
        placement: PlacementConfig,
    },
    TargetPosition {
        point: [Real; 2],
    },
    /// Reference rotation as `[w, i, j, k]`, normalized on load.
    CameraOrientation {
        reference: [Real; 4],
    },
    CameraFov,
}

impl PropertyKindConfig {
    pub fn reference_rotation(q: &[Real; 4]) -> UnitQuat {
        UnitQuat::from_quaternion(nalgebra::Quaternion::new(q[0], q[1], q[2], q[3]))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyConfig {
    pub name: String,
    /// Target names, resolved against [`ProblemConfig::targets`].
    #[serde(default)]
    pub targets: Vec<String>,
    pub weight: Real,
    pub spline: SplineConfig,
    pub kind: PropertyKindConfig,
    #[serde(default)]
    pub cost: Option<Real>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoxConfig {
    pub min: [Real; 3],
    pub max: [Real; 3],
}

impl BoxConfig {
    pub fn to_aabb(self) -> Aabb {
        Aabb::new(
            Pt3::new(self.min[0], self.min[1], self.min[2]),
            Pt3::new(self.max[0], self.max[1], self.max[2]),
        )
    }
}

fn default_roll() -> (Real, Real) {
    (0.0, 0.0)
}

fn default_vfov() -> (Real, Real) {
    (60.0, 60.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainConfig {
    LookAt {
        position: BoxConfig,
        look_at: BoxConfig,
        #[serde(default = "default_roll")]
        roll_deg: (Real, Real),
        #[serde(default = "default_vfov")]
        vfov_deg: (Real, Real),
    },
    Orbit {
        pivot: [Real; 3],
        distance: (Real, Real),
        theta_deg: (Real, Real),
        phi_deg: (Real, Real),
        #[serde(default = "default_roll")]
        roll_deg: (Real, Real),
        #[serde(default = "default_vfov")]
        vfov_deg: (Real, Real),
    },
}

/// Optional minimum clearance between the camera and scene geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearanceConfig {
    pub min_clearance: Real,
    /// Layers excluded from the clearance test (e.g. the targets' own).
    #[serde(default)]
    pub exclude_layers: Vec<u8>,
}

fn default_aspect() -> Real {
    16.0 / 9.0
}

/// A complete viewpoint problem in data form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemConfig {
    pub targets: Vec<TargetConfig>,
    pub properties: Vec<PropertyConfig>,
    pub domain: DomainConfig,
    #[serde(default)]
    pub clearance: Option<ClearanceConfig>,
    #[serde(default = "default_aspect")]
    pub viewport_aspect: Real,
}

/// Swarm knobs; `None` keeps the solver default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PsoConfig {
    #[serde(default)]
    pub num_candidates: Option<usize>,
    #[serde(default)]
    pub random_fraction: Option<Real>,
    #[serde(default)]
    pub c1: Option<Real>,
    #[serde(default)]
    pub c2: Option<Real>,
    #[serde(default)]
    pub w_max: Option<Real>,
    #[serde(default)]
    pub w_min: Option<Real>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl PsoConfig {
    pub fn to_options(&self) -> PsoOptions {
        let d = PsoOptions::default();
        PsoOptions {
            num_candidates: self.num_candidates.unwrap_or(d.num_candidates),
            random_fraction: self.random_fraction.unwrap_or(d.random_fraction),
            c1: self.c1.unwrap_or(d.c1),
            c2: self.c2.unwrap_or(d.c2),
            w_max: self.w_max.unwrap_or(d.w_max),
            w_min: self.w_min.unwrap_or(d.w_min),
            seed: self.seed.unwrap_or(d.seed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub time_limit_ms: u64,
    /// Stop early at this aggregated satisfaction.
    pub sat_threshold: Real,
    #[serde(default)]
    pub pso: PsoConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_config_json_roundtrip() {
        let config = ProblemConfig {
            targets: vec![TargetConfig {
                name: "hero".into(),
                size_sources: vec![0],
                occluders: vec![0],
                frame_object: None,
                n_rays: Some(8),
                max_points: None,
                visibility_method: Some(VisibilityMethodConfig::OnMesh),
            }],
            properties: vec![PropertyConfig {
                name: "hero size".into(),
                targets: vec!["hero".into()],
                weight: 2.0,
                spline: SplineConfig::peak(0.0, 0.25, 1.0),
                kind: PropertyKindConfig::Size {
                    mode: SizeModeConfig::Area,
                },
                cost: None,
            }],
            domain: DomainConfig::LookAt {
                position: BoxConfig {
                    min: [-10.0, -10.0, -10.0],
                    max: [10.0, 10.0, 10.0],
                },
                look_at: BoxConfig {
                    min: [-5.0, -5.0, -5.0],
                    max: [5.0, 5.0, 5.0],
                },
                roll_deg: (0.0, 0.0),
                vfov_deg: (40.0, 90.0),
            },
            clearance: Some(ClearanceConfig {
                min_clearance: 0.5,
                exclude_layers: vec![2],
            }),
            viewport_aspect: 1.0,
        };

        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("hero size") && json.contains("0.25"), "{}", json);

        let de: ProblemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(de.targets.len(), 1);
        assert_eq!(de.properties[0].targets, vec!["hero".to_string()]);
        assert!((de.properties[0].weight - 2.0).abs() < 1e-12);
        match de.domain {
            DomainConfig::LookAt { vfov_deg, .. } => {
                assert!((vfov_deg.1 - 90.0).abs() < 1e-12);
            }
            other => panic!("wrong domain variant: {:?}", other),
        }
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let json = r#"{
            "targets": [{"name": "t", "size_sources": [1]}],
            "properties": [{
                "name": "p",
                "targets": ["t"],
                "weight": 1.0,
                "spline": {"xs": [0.0, 1.0], "ys": [0.0, 1.0]},
                "kind": {"Size": {"mode": "Area"}}
            }],
            "domain": {"LookAt": {
                "position": {"min": [-1.0, -1.0, -1.0], "max": [1.0, 1.0, 1.0]},
                "look_at": {"min": [-1.0, -1.0, -1.0], "max": [1.0, 1.0, 1.0]}
            }}
        }"#;
        let de: ProblemConfig = serde_json::from_str(json).unwrap();
        assert!((de.viewport_aspect - 16.0 / 9.0).abs() < 1e-12);
        assert!(de.clearance.is_none());
        assert!(de.targets[0].occluders.is_empty());
        match de.domain {
            DomainConfig::LookAt {
                roll_deg, vfov_deg, ..
            } => {
                assert_eq!(roll_deg, (0.0, 0.0));
                assert_eq!(vfov_deg, (60.0, 60.0));
            }
            other => panic!("wrong domain variant: {:?}", other),
        }
    }

    #[test]
    fn search_config_json_roundtrip() {
        let config = SearchConfig {
            time_limit_ms: 1500,
            sat_threshold: 0.95,
            pso: PsoConfig {
                num_candidates: Some(80),
                seed: Some(42),
                ..PsoConfig::default()
            },
        };
        let json = serde_json::to_string(&config).unwrap();
        let de: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(de.time_limit_ms, 1500);
        let opts = de.pso.to_options();
        assert_eq!(opts.num_candidates, 80);
        assert_eq!(opts.seed, 42);
        // Unset knobs fall back to solver defaults.
        assert!((opts.c1 - PsoOptions::default().c1).abs() < 1e-12);
    }

    #[test]
    fn camera_orientation_reference_is_normalized() {
        let q = PropertyKindConfig::reference_rotation(&[2.0, 0.0, 0.0, 0.0]);
        assert!((q.norm() - 1.0).abs() < 1e-12);
    }
}
