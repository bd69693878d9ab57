use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, warn};

use crate::error::GridError;
use crate::integrator::Steps;
use crate::utils::parser::VoxelGridParser;
use crate::voxel_grid::{Layout, VoxelData, VoxelGrid};

/// VASP 体数据文件解析器（CHGCAR / CHGDIFF / LOCPOT 等）
///
/// 文件结构：POSCAR 头（注释、缩放因子、三个晶格矢量、可选的元素行、
/// 原子数、可选的 "Selective dynamics"、坐标模式、原子坐标），空行，
/// 网格行 `nx ny nz`，然后是 `nx*ny*nz` 个值，x 变化最快。
pub struct VaspParser;

impl VaspParser {
    pub fn new() -> Self {
        VaspParser
    }
}

impl Default for VaspParser {
    fn default() -> Self {
        Self::new()
    }
}

/// POSCAR 头部及网格行的解析结果
#[derive(Debug, Clone, PartialEq)]
struct VaspHeader {
    /// 已乘缩放因子的晶格矢量
    lattice: [[f64; 3]; 3],
    grid: [usize; 3],
    /// 数据开始的行号（0-indexed）
    data_start: usize,
}

/// 头部解析失败的原因
#[derive(Debug)]
enum HeaderError {
    /// 缺少第 n 行（0-indexed），补齐行数后可以重试
    Truncated(usize),
    Invalid(GridError),
}

impl From<HeaderError> for GridError {
    fn from(err: HeaderError) -> Self {
        match err {
            HeaderError::Truncated(idx) => {
                GridError::InvalidData(format!("文件行数不足，缺少第 {} 行", idx + 1))
            }
            HeaderError::Invalid(err) => err,
        }
    }
}

impl VaspHeader {
    /// 体积元与晶胞体积 / 网格点数一致；正交晶胞时即为各轴长度 / 点数
    ///
    /// 任一维点数为 0 或步长不是有限数时没有默认步长。
    fn voxel_steps(&self) -> Option<Steps> {
        if self.grid.contains(&0) {
            return None;
        }
        let [a, b, c] = self.lattice;
        let len_a = norm(a);
        let len_b = norm(b);
        let volume = dot(a, cross(b, c)).abs();
        let height = if len_a > 0.0 && len_b > 0.0 {
            volume / (len_a * len_b)
        } else {
            norm(c)
        };
        let steps = Steps::new(
            len_a / self.grid[0] as f64,
            len_b / self.grid[1] as f64,
            height / self.grid[2] as f64,
        );
        [steps.dx, steps.dy, steps.dz]
            .iter()
            .all(|step| step.is_finite())
            .then_some(steps)
    }
}

fn parse_header<S: AsRef<str>>(lines: &[S]) -> Result<VaspHeader, HeaderError> {
    // 第 2 行：缩放因子，负数表示目标晶胞体积
    let scale: f64 = first_token(line_at(lines, 1)?)
        .parse()
        .map_err(|e| invalid(format!("无法解析缩放因子: {}", e)))?;

    let mut lattice = [[0.0; 3]; 3];
    for (row, vector) in lattice.iter_mut().enumerate() {
        let values = parse_floats(line_at(lines, 2 + row)?)?;
        if values.len() < 3 {
            return Err(invalid(format!("第 {} 行晶格矢量不完整", row + 3)));
        }
        vector.copy_from_slice(&values[..3]);
    }

    let factor = if scale < 0.0 {
        let raw_volume = dot(lattice[0], cross(lattice[1], lattice[2])).abs();
        if raw_volume == 0.0 {
            return Err(invalid("晶格矢量线性相关".to_string()));
        }
        (-scale / raw_volume).cbrt()
    } else {
        scale
    };
    for vector in lattice.iter_mut() {
        for component in vector.iter_mut() {
            *component *= factor;
        }
    }

    // VASP5 在原子数前多一行元素符号
    let mut cursor = 5;
    if parse_counts(line_at(lines, cursor)?).is_none() {
        cursor += 1;
    }
    let counts = parse_counts(line_at(lines, cursor)?)
        .ok_or_else(|| invalid(format!("无法解析第 {} 行的原子数", cursor + 1)))?;
    let atom_count: usize = counts.iter().sum();
    cursor += 1;

    if starts_with_ignore_case(line_at(lines, cursor)?, 's') {
        cursor += 1;
    }
    // 坐标模式行（Direct / Cartesian）
    cursor += 1;
    cursor += atom_count;

    while line_at(lines, cursor)?.trim().is_empty() {
        cursor += 1;
    }

    let grid_values: Vec<usize> = line_at(lines, cursor)?
        .split_whitespace()
        .map(|s| s.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|e| invalid(format!("无法解析shape: {}", e)))?;
    if grid_values.len() != 3 {
        return Err(invalid(format!(
            "shape应该包含3个维度，但得到{}个",
            grid_values.len()
        )));
    }

    Ok(VaspHeader {
        lattice,
        grid: [grid_values[0], grid_values[1], grid_values[2]],
        data_start: cursor + 1,
    })
}

impl VoxelGridParser for VaspParser {
    fn extensions(&self) -> &'static [&'static str] {
        &["vasp"]
    }

    fn name(&self) -> &'static str {
        "VASP Parser"
    }

    fn parse(&self, path: &Path) -> Result<VoxelGrid, GridError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
        parse_lines(&lines)
    }

    fn read_shape(&self, path: &Path) -> Result<Vec<usize>, GridError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file).lines();

        // 头部长度取决于原子数：按缺少的行号补读，内容无效时立即返回
        let mut lines = Vec::new();
        loop {
            match parse_header(&lines) {
                Ok(header) => return Ok(header.grid.to_vec()),
                Err(HeaderError::Truncated(needed)) => {
                    while lines.len() <= needed {
                        match reader.next() {
                            Some(line) => lines.push(line?),
                            None => return Err(HeaderError::Truncated(needed).into()),
                        }
                    }
                }
                Err(HeaderError::Invalid(err)) => return Err(err),
            }
        }
    }
}

fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Result<VoxelGrid, GridError> {
    let header = parse_header(lines)?;
    let total_elements = header
        .grid
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| GridError::InvalidData(format!("元素总数溢出: {:?}", header.grid)))?;

    // 网格行可能写错，预分配不超过文件中剩余的行数所能容纳的量
    let mut data = Vec::with_capacity(total_elements.min(lines.len().saturating_mul(8)));
    'lines: for line in lines.iter().skip(header.data_start) {
        for token in line.as_ref().split_whitespace() {
            if data.len() == total_elements {
                break 'lines;
            }
            // 处理科学计数法（如 0.14631837E+00）
            match token.parse::<f64>() {
                Ok(value) => data.push(value),
                Err(_) => warn!("无法解析值 '{}'，已跳过", token),
            }
        }
    }
    debug!(
        "VASP 网格 {:?}，读取 {} 个值，默认步长 {:?}",
        header.grid,
        data.len(),
        header.voxel_steps()
    );

    let grid = VoxelGrid::with_layout(
        header.grid.to_vec(),
        Layout::ColumnMajor,
        VoxelData::Real(data),
    )?;
    Ok(match header.voxel_steps() {
        Some(steps) => grid.with_default_steps(steps),
        None => grid,
    })
}

fn line_at<S: AsRef<str>>(lines: &[S], idx: usize) -> Result<&str, HeaderError> {
    lines
        .get(idx)
        .map(|l| l.as_ref())
        .ok_or(HeaderError::Truncated(idx))
}

fn invalid(message: String) -> HeaderError {
    HeaderError::Invalid(GridError::InvalidData(message))
}

fn first_token(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

fn starts_with_ignore_case(line: &str, c: char) -> bool {
    line.trim_start()
        .chars()
        .next()
        .is_some_and(|first| first.eq_ignore_ascii_case(&c))
}

fn parse_floats(line: &str) -> Result<Vec<f64>, HeaderError> {
    line.split_whitespace()
        .map(|s| s.parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| invalid(format!("无法解析浮点数: {}", e)))
}

fn parse_counts(line: &str) -> Option<Vec<usize>> {
    let counts: Vec<usize> = line
        .split_whitespace()
        .map(|s| s.parse::<usize>())
        .collect::<Result<_, _>>()
        .ok()?;
    (!counts.is_empty()).then_some(counts)
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}
