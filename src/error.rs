use thiserror::Error;

/// 积分输入的维度不是 3
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("积分网格必须是三维的，但得到 {rank} 维")]
pub struct ShapeError {
    pub rank: usize,
}

/// 网格读取、解码、存储过程中的错误
#[derive(Error, Debug)]
pub enum GridError {
    #[error("读取文件失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("文件内容无效: {0}")]
    InvalidData(String),
    #[error("数据量不匹配: shape {shape:?} 需要 {expected} 个元素，但提供了 {actual} 个")]
    LengthMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
    #[error("无效的网格魔数: {0:?}")]
    BadMagic([u8; 4]),
    #[error("不支持的编码版本: {0}")]
    UnsupportedVersion(u8),
    #[error("未知的元素类型: {0}")]
    UnknownKind(u8),
    #[error("不支持的文件格式: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// 服务入口处的参数错误，不会传到积分器
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("缺少步长参数 {0}")]
    MissingStep(&'static str),
    #[error("步长 {name} 必须是有限数，但得到 {value}")]
    NonFiniteStep { name: &'static str, value: f64 },
    #[error("文件 {0} 没有默认步长，请提供 dx、dy、dz")]
    NoDefaultSteps(String),
    #[error("无效的文件名: {0}")]
    InvalidFileName(String),
}

pub type Result<T, E = GridError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_error_converts_into_grid_error() {
        let err: GridError = ShapeError { rank: 2 }.into();
        assert!(matches!(err, GridError::Shape(ShapeError { rank: 2 })));
        assert!(err.to_string().contains("2"));
    }

    #[test]
    fn argument_error_names_the_step() {
        let err = ArgumentError::NonFiniteStep {
            name: "dy",
            value: f64::INFINITY,
        };
        assert!(err.to_string().contains("dy"));
    }

    #[test]
    fn length_mismatch_reports_counts() {
        let err = GridError::LengthMismatch {
            shape: vec![2, 2, 2],
            expected: 8,
            actual: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("8"));
        assert!(msg.contains("7"));
    }
}
