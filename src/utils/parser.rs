use std::path::Path;

use crate::error::GridError;
use crate::voxel_grid::VoxelGrid;

/// 一种网格文件格式
///
/// 每种格式认领若干扩展名，由 [`ParserRegistry`](crate::parser_registry::ParserRegistry)
/// 按文件名分派。
pub trait VoxelGridParser: Send + Sync {
    /// 出现在响应和日志里的名称
    fn name(&self) -> &'static str;

    /// 认领的扩展名，小写且不带点
    fn extensions(&self) -> &'static [&'static str];

    fn claims(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// 读取整个网格，包括文件能推导出的默认步长
    fn parse(&self, path: &Path) -> Result<VoxelGrid, GridError>;

    /// 只看文件头得到 shape，不加载数据块
    fn read_shape(&self, path: &Path) -> Result<Vec<usize>, GridError>;
}
