//! 境界の判定と境界条件の残差。

use crate::airfoil::Point;
use crate::config::FluidProperties;
use crate::geometry::{Rectangle, is_close};
use crate::pinn::{FieldJet, PRESSURE};
use burn::tensor::Tensor;
use burn::tensor::backend::Backend;
use std::fmt;

/// 境界の区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryRegion {
    /// 流入境界 x = xmin
    Inlet,
    /// 上下の遠方境界 y = ymin, ymax
    TopBottom,
    /// 流出境界 x = xmax
    Outlet,
    /// 翼面 (遠方境界以外の境界)
    Airfoil,
}

impl BoundaryRegion {
    pub const ALL: [BoundaryRegion; 4] = [
        BoundaryRegion::Inlet,
        BoundaryRegion::TopBottom,
        BoundaryRegion::Outlet,
        BoundaryRegion::Airfoil,
    ];

    /// 境界上の点 `p` がこの区分に属するか。
    ///
    /// 角の点は流入(流出)と上下の両方に属します。
    pub fn contains(&self, p: Point, farfield: &Rectangle, on_boundary: bool) -> bool {
        if !on_boundary {
            return false;
        }
        match self {
            BoundaryRegion::Inlet => is_close(p[0], farfield.min[0]),
            BoundaryRegion::TopBottom => {
                is_close(p[1], farfield.max[1]) || is_close(p[1], farfield.min[1])
            }
            BoundaryRegion::Outlet => is_close(p[0], farfield.max[0]),
            BoundaryRegion::Airfoil => !farfield.on_boundary(p),
        }
    }
}

impl fmt::Display for BoundaryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoundaryRegion::Inlet => "inlet",
            BoundaryRegion::TopBottom => "top_bottom",
            BoundaryRegion::Outlet => "outlet",
            BoundaryRegion::Airfoil => "airfoil",
        };
        write!(f, "{}", name)
    }
}

/// 境界で課す拘束
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// u = 目標値
    VelocityU(f64),
    /// v = 目標値
    VelocityV(f64),
    /// p = 目標値
    Pressure(f64),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::VelocityU(target) => write!(f, "u = {}", target),
            Constraint::VelocityV(target) => write!(f, "v = {}", target),
            Constraint::Pressure(target) => write!(f, "p = {}", target),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryCondition {
    pub region: BoundaryRegion,
    pub constraint: Constraint,
}

impl BoundaryCondition {
    pub fn new(region: BoundaryRegion, constraint: Constraint) -> Self {
        Self { region, constraint }
    }

    /// 翼型まわりの流れの標準的な7つの境界条件。
    ///
    /// 流入と上下は一様流 (u = U∞, v = 0)、流出は p = 0、翼面は滑りなし (u = v = 0) です。
    pub fn standard_set(fluid: &FluidProperties) -> Vec<Self> {
        let u_inf = fluid.inlet_velocity;
        vec![
            Self::new(BoundaryRegion::Inlet, Constraint::VelocityU(u_inf)),
            Self::new(BoundaryRegion::Inlet, Constraint::VelocityV(0.0)),
            Self::new(BoundaryRegion::TopBottom, Constraint::VelocityU(u_inf)),
            Self::new(BoundaryRegion::TopBottom, Constraint::VelocityV(0.0)),
            Self::new(BoundaryRegion::Outlet, Constraint::Pressure(0.0)),
            Self::new(BoundaryRegion::Airfoil, Constraint::VelocityU(0.0)),
            Self::new(BoundaryRegion::Airfoil, Constraint::VelocityV(0.0)),
        ]
    }

    /// 境界点での残差 `[N, 1]`
    pub fn residual<B: Backend>(&self, jet: &FieldJet<B>) -> Tensor<B, 2> {
        match self.constraint {
            Constraint::VelocityU(target) => jet.velocity().0.sub_scalar(target),
            Constraint::VelocityV(target) => jet.velocity().1.sub_scalar(target),
            Constraint::Pressure(target) => jet.channel(PRESSURE).sub_scalar(target),
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.region, self.constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pinn::NUM_CHANNELS;
    use crate::problem::tensor_values;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;

    type TestBackend = NdArray<f64>;

    fn farfield() -> Rectangle {
        Rectangle::new([0.0, 0.0], [1.0, 0.7]).unwrap()
    }

    #[test]
    fn regions_follow_farfield_edges() {
        let rect = farfield();
        assert!(BoundaryRegion::Inlet.contains([0.0, 0.3], &rect, true));
        assert!(!BoundaryRegion::Inlet.contains([0.0, 0.3], &rect, false));
        assert!(BoundaryRegion::Outlet.contains([1.0, 0.3], &rect, true));
        assert!(BoundaryRegion::TopBottom.contains([0.4, 0.7], &rect, true));
        assert!(BoundaryRegion::TopBottom.contains([0.4, 0.0], &rect, true));
        assert!(!BoundaryRegion::Airfoil.contains([0.4, 0.0], &rect, true));
        assert!(BoundaryRegion::Airfoil.contains([0.3, 0.36], &rect, true));

        // 角は流入と上下の両方
        assert!(BoundaryRegion::Inlet.contains([0.0, 0.7], &rect, true));
        assert!(BoundaryRegion::TopBottom.contains([0.0, 0.7], &rect, true));
    }

    #[test]
    fn standard_set_has_seven_conditions() {
        let fluid = FluidProperties::default();
        let set = BoundaryCondition::standard_set(&fluid);
        assert_eq!(set.len(), 7);
        assert_eq!(
            set.iter().filter(|bc| bc.region == BoundaryRegion::Airfoil).count(),
            2
        );
        assert_eq!(set[4].to_string(), "outlet: p = 0");
    }

    #[test]
    fn residual_measures_distance_to_target() {
        // ψ_y = u = 1.5, ψ_x = −v = 0.25, p = 2.0
        let device = Default::default();
        let row = |vals: [f64; NUM_CHANNELS]| {
            Tensor::<TestBackend, 2>::from_data(TensorData::new(vals.to_vec(), [1, NUM_CHANNELS]), &device)
        };
        let zeros = Tensor::<TestBackend, 2>::zeros([1, NUM_CHANNELS], &device);
        let jet = FieldJet::new(
            row([0.0, 2.0, 0.0, 0.0, 0.0]),
            row([0.25, 0.0, 0.0, 0.0, 0.0]),
            row([1.5, 0.0, 0.0, 0.0, 0.0]),
            zeros.clone(),
            zeros.clone(),
            zeros,
        )
        .unwrap();

        let u = BoundaryCondition::new(BoundaryRegion::Inlet, Constraint::VelocityU(1.0));
        let v = BoundaryCondition::new(BoundaryRegion::Inlet, Constraint::VelocityV(0.0));
        let p = BoundaryCondition::new(BoundaryRegion::Outlet, Constraint::Pressure(0.0));
        assert_eq!(tensor_values(u.residual(&jet)).unwrap(), vec![0.5]);
        assert_eq!(tensor_values(v.residual(&jet)).unwrap(), vec![-0.25]);
        assert_eq!(tensor_values(p.residual(&jet)).unwrap(), vec![2.0]);
    }
}
