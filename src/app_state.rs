use std::sync::Arc;

use crate::grid_store::GridStore;
use crate::parser_registry::ParserRegistry;

/// 全局应用状态，负责在各个 handler 之间共享解析器、资源目录与上传的网格
pub struct AppState {
    pub parser_registry: Arc<ParserRegistry>,
    pub resource_dir: String,
    pub grid_store: Arc<GridStore>,
    /// 上传的 gzip 数据解压后的上限（字节）
    pub max_decoded_bytes: usize,
}
