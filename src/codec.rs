//! 体素网格二进制编码
//!
//! 布局（全部小端）：
//! `b"VXGD"` | 版本 u8 | 元素类型 u8 (0 实数, 1 复数) | 维数 u8 | 每维长度 u64 | 数据
//!
//! 数据按行主序排列，复数按 (re, im) 交错存储。维数随数据保存，
//! 非三维网格可以正常解码，由积分器负责拒绝。

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use num_complex::Complex64;

use crate::error::{GridError, Result};
use crate::integrator::SampleGrid;
use crate::voxel_grid::{VoxelData, VoxelGrid};

pub const MAGIC: [u8; 4] = *b"VXGD";
pub const VERSION: u8 = 1;

const KIND_REAL: u8 = 0;
const KIND_COMPLEX: u8 = 1;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// 将网格编码为二进制（行主序）
pub fn encode(grid: &VoxelGrid) -> Result<Vec<u8>> {
    let rank = u8::try_from(grid.rank())
        .map_err(|_| GridError::InvalidData(format!("维数过大: {}", grid.rank())))?;

    let mut bytes = Vec::with_capacity(8 + grid.rank() * 8 + grid.element_count() * 16);
    bytes.write_all(&MAGIC)?;
    bytes.write_u8(VERSION)?;
    bytes.write_u8(match grid.data() {
        VoxelData::Real(_) => KIND_REAL,
        VoxelData::Complex(_) => KIND_COMPLEX,
    })?;
    bytes.write_u8(rank)?;
    for &extent in grid.shape() {
        bytes.write_u64::<LittleEndian>(extent as u64)?;
    }

    // 列主序网格需要按逻辑顺序重新遍历
    match grid.view() {
        SampleGrid::Real(view) => {
            for value in view.iter() {
                bytes.write_f64::<LittleEndian>(*value)?;
            }
        }
        SampleGrid::Complex(view) => {
            for value in view.iter() {
                bytes.write_f64::<LittleEndian>(value.re)?;
                bytes.write_f64::<LittleEndian>(value.im)?;
            }
        }
    }
    Ok(bytes)
}

/// 编码并用 gzip 压缩
pub fn encode_gzip(grid: &VoxelGrid) -> Result<Vec<u8>> {
    let raw = encode(grid)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}

/// 头部：元素类型与各维长度
struct Header {
    kind: u8,
    shape: Vec<usize>,
}

fn read_header(cursor: &mut Cursor<&[u8]>) -> Result<Header> {
    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic).map_err(truncated)?;
    if magic != MAGIC {
        return Err(GridError::BadMagic(magic));
    }

    let version = cursor.read_u8().map_err(truncated)?;
    if version != VERSION {
        return Err(GridError::UnsupportedVersion(version));
    }

    let kind = cursor.read_u8().map_err(truncated)?;
    if kind != KIND_REAL && kind != KIND_COMPLEX {
        return Err(GridError::UnknownKind(kind));
    }

    let rank = cursor.read_u8().map_err(truncated)? as usize;
    let mut shape = Vec::with_capacity(rank);
    for _ in 0..rank {
        let extent = cursor.read_u64::<LittleEndian>().map_err(truncated)?;
        let extent = usize::try_from(extent)
            .map_err(|_| GridError::InvalidData(format!("维度长度过大: {}", extent)))?;
        shape.push(extent);
    }
    Ok(Header { kind, shape })
}

/// 解码未压缩的二进制网格
pub fn decode(bytes: &[u8]) -> Result<VoxelGrid> {
    let mut cursor = Cursor::new(bytes);
    let Header { kind, shape } = read_header(&mut cursor)?;

    let total_elements = shape
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| GridError::InvalidData(format!("元素总数溢出: {:?}", shape)))?;

    // 先检查剩余字节数，避免按伪造的 shape 预分配内存
    let element_bytes = if kind == KIND_COMPLEX { 16 } else { 8 };
    let remaining = bytes.len() - cursor.position() as usize;
    let available = remaining / element_bytes;
    if available != total_elements || remaining % element_bytes != 0 {
        return Err(GridError::LengthMismatch {
            shape,
            expected: total_elements,
            actual: available,
        });
    }

    let data = if kind == KIND_COMPLEX {
        let mut values = Vec::with_capacity(total_elements);
        for _ in 0..total_elements {
            let re = cursor.read_f64::<LittleEndian>()?;
            let im = cursor.read_f64::<LittleEndian>()?;
            values.push(Complex64::new(re, im));
        }
        VoxelData::Complex(values)
    } else {
        let mut values = vec![0.0; total_elements];
        cursor.read_f64_into::<LittleEndian>(&mut values)?;
        VoxelData::Real(values)
    };

    VoxelGrid::new(shape, data)
}

/// 文件解析时解压后的默认上限
pub const DEFAULT_MAX_DECODED_BYTES: usize = 1 << 30;

/// 自动识别 gzip 并解码
///
/// 解压后的数据超过 `max_decoded_bytes` 时直接报错，不再继续解压。
pub fn decode_auto(bytes: &[u8], max_decoded_bytes: usize) -> Result<VoxelGrid> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut raw = Vec::new();
        GzDecoder::new(bytes)
            .take((max_decoded_bytes as u64).saturating_add(1))
            .read_to_end(&mut raw)?;
        if raw.len() > max_decoded_bytes {
            return Err(GridError::InvalidData(format!(
                "解压后的数据超过上限 {} 字节",
                max_decoded_bytes
            )));
        }
        decode(&raw)
    } else {
        decode(bytes)
    }
}

/// 仅读取头部中的 shape
pub fn read_shape(bytes: &[u8]) -> Result<Vec<usize>> {
    let mut cursor = Cursor::new(bytes);
    read_header(&mut cursor).map(|header| header.shape)
}

fn truncated(_: std::io::Error) -> GridError {
    GridError::InvalidData("数据被截断".to_string())
}
