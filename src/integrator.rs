//! 三维黎曼和积分
//!
//! 对三维采样网格的所有元素求和，再乘以体积元 `dx * dy * dz`，
//! 近似 ∫∫∫ f(x, y, z) dx dy dz。实数网格返回单个标量，复数网格返回
//! (实部, 虚部)。

use ndarray::{ArrayView3, ArrayViewD, Ix3};
use num_complex::Complex64;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ShapeError;

/// 网格元素：一个实部和一个可选的虚部
pub trait Sample: Copy {
    fn re(self) -> f64;
    fn im(self) -> Option<f64>;
}

impl Sample for f64 {
    #[inline]
    fn re(self) -> f64 {
        self
    }

    #[inline]
    fn im(self) -> Option<f64> {
        None
    }
}

impl Sample for Complex64 {
    #[inline]
    fn re(self) -> f64 {
        self.re
    }

    #[inline]
    fn im(self) -> Option<f64> {
        Some(self.im)
    }
}

/// 只读的采样网格视图，元素类型在构造时确定
#[derive(Debug, Clone)]
pub enum SampleGrid<'a> {
    Real(ArrayViewD<'a, f64>),
    Complex(ArrayViewD<'a, Complex64>),
}

impl<'a> SampleGrid<'a> {
    pub fn rank(&self) -> usize {
        match self {
            SampleGrid::Real(view) => view.ndim(),
            SampleGrid::Complex(view) => view.ndim(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            SampleGrid::Real(view) => view.shape(),
            SampleGrid::Complex(view) => view.shape(),
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, SampleGrid::Complex(_))
    }
}

impl<'a> From<ArrayView3<'a, f64>> for SampleGrid<'a> {
    fn from(view: ArrayView3<'a, f64>) -> Self {
        SampleGrid::Real(view.into_dyn())
    }
}

impl<'a> From<ArrayView3<'a, Complex64>> for SampleGrid<'a> {
    fn from(view: ArrayView3<'a, Complex64>) -> Self {
        SampleGrid::Complex(view.into_dyn())
    }
}

impl<'a> From<ArrayViewD<'a, f64>> for SampleGrid<'a> {
    fn from(view: ArrayViewD<'a, f64>) -> Self {
        SampleGrid::Real(view)
    }
}

impl<'a> From<ArrayViewD<'a, Complex64>> for SampleGrid<'a> {
    fn from(view: ArrayViewD<'a, Complex64>) -> Self {
        SampleGrid::Complex(view)
    }
}

/// 三个方向的步长
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Steps {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Steps {
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    /// 体积元 dx * dy * dz
    pub fn volume(&self) -> f64 {
        self.dx * self.dy * self.dz
    }
}

impl Default for Steps {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// 积分结果，类型由输入网格的元素类型决定
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntegralResult {
    Real(f64),
    Complex { re: f64, im: f64 },
}

impl IntegralResult {
    pub fn re(&self) -> f64 {
        match *self {
            IntegralResult::Real(value) => value,
            IntegralResult::Complex { re, .. } => re,
        }
    }

    /// 实数结果的虚部为 0
    pub fn im(&self) -> f64 {
        match *self {
            IntegralResult::Real(_) => 0.0,
            IntegralResult::Complex { im, .. } => im,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, IntegralResult::Complex { .. })
    }
}

impl Serialize for IntegralResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            IntegralResult::Real(value) => {
                let mut s = serializer.serialize_struct("IntegralResult", 2)?;
                s.serialize_field("kind", "real")?;
                s.serialize_field("value", &value)?;
                s.end()
            }
            IntegralResult::Complex { re, im } => {
                let mut s = serializer.serialize_struct("IntegralResult", 3)?;
                s.serialize_field("kind", "complex")?;
                s.serialize_field("re", &re)?;
                s.serialize_field("im", &im)?;
                s.end()
            }
        }
    }
}

/// 对三维网格做黎曼和积分
///
/// 网格必须恰好是三维的，否则返回 [`ShapeError`]，不做任何累加。
/// 步长不做符号或范围检查，零或负步长按原值缩放结果。
/// 空网格（任一维为 0）返回零值结果；NaN/Inf 按 IEEE-754 传播。
pub fn integrate(
    grid: &SampleGrid<'_>,
    dx: f64,
    dy: f64,
    dz: f64,
) -> Result<IntegralResult, ShapeError> {
    let volume = dx * dy * dz;
    match grid {
        SampleGrid::Real(view) => {
            let (re, _) = accumulate(as_3d(view)?);
            Ok(IntegralResult::Real(re * volume))
        }
        SampleGrid::Complex(view) => {
            let (re, im) = accumulate(as_3d(view)?);
            Ok(IntegralResult::Complex {
                re: re * volume,
                im: im * volume,
            })
        }
    }
}

pub fn integrate_with(grid: &SampleGrid<'_>, steps: Steps) -> Result<IntegralResult, ShapeError> {
    integrate(grid, steps.dx, steps.dy, steps.dz)
}

fn as_3d<'a, T>(view: &ArrayViewD<'a, T>) -> Result<ArrayView3<'a, T>, ShapeError> {
    let rank = view.ndim();
    view.clone()
        .into_dimensionality::<Ix3>()
        .map_err(|_| ShapeError { rank })
}

fn accumulate<T: Sample>(view: ArrayView3<'_, T>) -> (f64, f64) {
    let (n0, n1, n2) = view.dim();
    let mut sum_real = 0.0;
    let mut sum_imag = 0.0;
    for i in 0..n0 {
        for j in 0..n1 {
            for k in 0..n2 {
                let sample = view[[i, j, k]];
                sum_real += sample.re();
                if let Some(im) = sample.im() {
                    sum_imag += im;
                }
            }
        }
    }
    (sum_real, sum_imag)
}
