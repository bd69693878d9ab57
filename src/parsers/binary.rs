use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::codec;
use crate::error::GridError;
use crate::utils::parser::VoxelGridParser;
use crate::voxel_grid::VoxelGrid;

/// 二进制网格文件解析器（`.vxg` 未压缩，`.vxgz` gzip 压缩）
pub struct BinaryGridParser;

impl BinaryGridParser {
    pub fn new() -> Self {
        BinaryGridParser
    }
}

impl Default for BinaryGridParser {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelGridParser for BinaryGridParser {
    fn extensions(&self) -> &'static [&'static str] {
        &["vxg", "vxgz"]
    }

    fn name(&self) -> &'static str {
        "Binary Grid Parser"
    }

    fn parse(&self, path: &Path) -> Result<VoxelGrid, GridError> {
        let bytes = std::fs::read(path)?;
        codec::decode_auto(&bytes, codec::DEFAULT_MAX_DECODED_BYTES)
    }

    fn read_shape(&self, path: &Path) -> Result<Vec<usize>, GridError> {
        let mut file = File::open(path)?;
        let mut magic = [0u8; 2];
        file.read_exact(&mut magic)?;
        if magic == [0x1f, 0x8b] {
            // 压缩文件无法只读头部，整体解码
            return self.parse(path).map(|grid| grid.shape().to_vec());
        }

        // 头部最多 7 + 255 * 8 字节
        let mut header = magic.to_vec();
        file.take(7 + 255 * 8 - 2).read_to_end(&mut header)?;
        codec::read_shape(&header)
    }
}
