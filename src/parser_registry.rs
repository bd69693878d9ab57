use std::path::Path;

use crate::error::GridError;
use crate::utils::parser::VoxelGridParser;

/// 按扩展名把网格文件分派给对应格式
pub struct ParserRegistry {
    parsers: Vec<Box<dyn VoxelGridParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            parsers: crate::parsers::get_all_parsers(),
        }
    }

    /// `extension` 不带点，大小写不敏感
    pub fn find_parser(&self, extension: &str) -> Option<&dyn VoxelGridParser> {
        self.parsers
            .iter()
            .map(|parser| parser.as_ref())
            .find(|parser| parser.claims(extension))
    }

    /// 取路径最后一段扩展名对应的格式，没有扩展名或无人认领时返回 `UnsupportedFormat`
    pub fn parser_for(&self, path: &Path) -> Result<&dyn VoxelGridParser, GridError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.find_parser(ext))
            .ok_or_else(|| GridError::UnsupportedFormat(path.display().to_string()))
    }

    /// 排序去重后的扩展名
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = self
            .parsers
            .iter()
            .flat_map(|parser| parser.extensions().iter().copied())
            .collect();
        extensions.sort_unstable();
        extensions.dedup();
        extensions
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
