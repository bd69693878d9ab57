use actix_web::HttpResponse;
use actix_web::error::BlockingError;
use log::{error, warn};

use crate::error::{ArgumentError, GridError};

/// 请求处理中可能出现的错误
#[derive(Debug)]
pub enum RequestError {
    Argument(ArgumentError),
    Grid(GridError),
    NotFound(String),
}

impl From<ArgumentError> for RequestError {
    fn from(err: ArgumentError) -> Self {
        RequestError::Argument(err)
    }
}

impl From<GridError> for RequestError {
    fn from(err: GridError) -> Self {
        RequestError::Grid(err)
    }
}

impl From<BlockingError> for RequestError {
    fn from(err: BlockingError) -> Self {
        RequestError::Grid(GridError::Io(std::io::Error::other(err.to_string())))
    }
}

impl RequestError {
    /// 转换为 JSON 错误响应
    pub fn into_response(self) -> HttpResponse {
        match self {
            RequestError::Argument(err) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "参数错误",
                "details": err.to_string(),
            })),
            RequestError::NotFound(what) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "资源不存在",
                "details": what,
            })),
            RequestError::Grid(GridError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                HttpResponse::NotFound().json(serde_json::json!({
                    "error": "文件不存在或无法访问",
                    "details": e.to_string(),
                }))
            }
            RequestError::Grid(GridError::Io(e)) => {
                error!("读取网格失败: {}", e);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "读取网格失败",
                    "details": e.to_string(),
                }))
            }
            RequestError::Grid(err @ GridError::UnsupportedFormat(_)) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "不支持的文件格式",
                    "details": err.to_string(),
                }))
            }
            RequestError::Grid(err @ GridError::Shape(_)) => {
                HttpResponse::UnprocessableEntity().json(serde_json::json!({
                    "error": "网格维度错误",
                    "details": err.to_string(),
                }))
            }
            RequestError::Grid(err) => {
                warn!("网格数据无效: {}", err);
                HttpResponse::UnprocessableEntity().json(serde_json::json!({
                    "error": "网格数据无效",
                    "details": err.to_string(),
                }))
            }
        }
    }
}
