use ndarray::{ArrayViewD, IxDyn, ShapeBuilder};
use num_complex::Complex64;
use serde::Serialize;

use crate::error::GridError;
use crate::integrator::{SampleGrid, Steps};

/// 元素类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Real,
    Complex,
}

/// 网格数据，实数或复数
#[derive(Debug, Clone, PartialEq)]
pub enum VoxelData {
    Real(Vec<f64>),
    Complex(Vec<Complex64>),
}

impl VoxelData {
    pub fn len(&self) -> usize {
        match self {
            VoxelData::Real(values) => values.len(),
            VoxelData::Complex(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            VoxelData::Real(_) => ElementKind::Real,
            VoxelData::Complex(_) => ElementKind::Complex,
        }
    }
}

/// 数据在内存中的排列顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// C 顺序，最后一维变化最快
    RowMajor,
    /// Fortran 顺序，第一维变化最快（VASP 体数据即如此）
    ColumnMajor,
}

/// 体素网格数据结构
/// 表示规则网格上的标量场数据，积分时要求恰好三维
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    /// 网格维度，例如 [nx, ny, nz]
    shape: Vec<usize>,
    layout: Layout,
    data: VoxelData,
    /// 文件自带的默认步长（如由晶格常数推导），没有则为 None
    default_steps: Option<Steps>,
}

impl VoxelGrid {
    /// 创建新的行主序体素网格
    pub fn new(shape: Vec<usize>, data: VoxelData) -> Result<Self, GridError> {
        Self::with_layout(shape, Layout::RowMajor, data)
    }

    pub fn with_layout(
        shape: Vec<usize>,
        layout: Layout,
        data: VoxelData,
    ) -> Result<Self, GridError> {
        let total_elements = shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| GridError::InvalidData(format!("shape {:?} 的元素数量溢出", shape)))?;

        if data.len() != total_elements {
            return Err(GridError::LengthMismatch {
                shape,
                expected: total_elements,
                actual: data.len(),
            });
        }

        // 含零维时元素数量为 0，但其余维度仍需能构成合法的视图
        let addressable = match &data {
            VoxelData::Real(values) => view_shape(&shape, layout, values).is_ok(),
            VoxelData::Complex(values) => view_shape(&shape, layout, values).is_ok(),
        };
        if !addressable {
            return Err(GridError::InvalidData(format!(
                "shape {:?} 超出可寻址范围",
                shape
            )));
        }

        Ok(VoxelGrid {
            shape,
            layout,
            data,
            default_steps: None,
        })
    }

    pub fn with_default_steps(mut self, steps: Steps) -> Self {
        self.default_steps = Some(steps);
        self
    }

    /// 获取 shape
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// 获取整个数据的引用
    pub fn data(&self) -> &VoxelData {
        &self.data
    }

    pub fn default_steps(&self) -> Option<Steps> {
        self.default_steps
    }

    pub fn kind(&self) -> ElementKind {
        self.data.kind()
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn element_count(&self) -> usize {
        self.data.len()
    }

    /// 借出只读视图，供积分器使用
    pub fn view(&self) -> SampleGrid<'_> {
        match &self.data {
            VoxelData::Real(values) => SampleGrid::Real(self.array_view(values)),
            VoxelData::Complex(values) => SampleGrid::Complex(self.array_view(values)),
        }
    }

    fn array_view<'a, T>(&self, values: &'a [T]) -> ArrayViewD<'a, T> {
        // 字段私有，with_layout 已用同样的参数构造过一次
        view_shape(&self.shape, self.layout, values)
            .unwrap_or_else(|_| unreachable!("shape 已在构造时校验"))
    }
}

fn view_shape<'a, T>(
    shape: &[usize],
    layout: Layout,
    values: &'a [T],
) -> Result<ArrayViewD<'a, T>, ndarray::ShapeError> {
    ArrayViewD::from_shape(IxDyn(shape).set_f(layout == Layout::ColumnMajor), values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_length() {
        let err = VoxelGrid::new(vec![2, 2, 2], VoxelData::Real(vec![0.0; 7])).unwrap_err();
        assert!(matches!(
            err,
            GridError::LengthMismatch {
                expected: 8,
                actual: 7,
                ..
            }
        ));
    }

    #[test]
    fn view_keeps_shape_and_kind() {
        let grid = VoxelGrid::new(
            vec![1, 2, 3],
            VoxelData::Complex(vec![Complex64::new(1.0, -1.0); 6]),
        )
        .unwrap();
        let view = grid.view();
        assert_eq!(view.shape(), &[1, 2, 3]);
        assert!(view.is_complex());
        assert_eq!(grid.kind(), ElementKind::Complex);
    }

    #[test]
    fn column_major_view_indexes_first_axis_fastest() {
        let grid = VoxelGrid::with_layout(
            vec![2, 3, 1],
            Layout::ColumnMajor,
            VoxelData::Real(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]),
        )
        .unwrap();
        let SampleGrid::Real(view) = grid.view() else {
            panic!("expected a real view");
        };
        assert_eq!(view[[1, 0, 0]], 1.0);
        assert_eq!(view[[0, 1, 0]], 2.0);
        assert_eq!(view[[1, 2, 0]], 5.0);
    }

    #[test]
    fn unaddressable_shape_with_zero_axis_is_rejected() {
        let err =
            VoxelGrid::new(vec![0, 1 << 62, 4], VoxelData::Real(Vec::new())).unwrap_err();
        assert!(matches!(err, GridError::InvalidData(_)));

        let err = VoxelGrid::new(vec![1 << 62, 8, 8], VoxelData::Real(Vec::new())).unwrap_err();
        assert!(matches!(err, GridError::InvalidData(_)));

        let empty = VoxelGrid::new(vec![0, 3, 4], VoxelData::Real(Vec::new())).unwrap();
        assert_eq!(empty.view().shape(), &[0, 3, 4]);
    }

    #[test]
    fn non_three_dimensional_grids_can_be_held() {
        let grid = VoxelGrid::new(vec![4], VoxelData::Real(vec![1.0; 4])).unwrap();
        assert_eq!(grid.rank(), 1);
        assert_eq!(grid.view().rank(), 1);
    }
}
