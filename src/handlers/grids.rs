use actix_web::{HttpResponse, Responder, delete, post, web};
use log::info;
use serde::Serialize;

use crate::app_state::AppState;
use crate::codec;
use crate::handlers::errors::RequestError;
use crate::voxel_grid::ElementKind;

#[derive(Serialize)]
pub struct UploadResponse {
    pub grid_id: String,
    pub shape: Vec<usize>,
    pub kind: ElementKind,
}

/// 上传二进制网格（可 gzip 压缩），返回 grid_id
#[post("/grids")]
pub async fn upload_grid(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let size = body.len();
    let limit = data.max_decoded_bytes;
    let decoded = web::block(move || codec::decode_auto(&body, limit)).await;
    let grid = match decoded {
        Ok(Ok(grid)) => grid,
        Ok(Err(err)) => return RequestError::from(err).into_response(),
        Err(err) => return RequestError::from(err).into_response(),
    };

    let shape = grid.shape().to_vec();
    let kind = grid.kind();
    let grid_id = data.grid_store.insert(grid);
    info!(
        "[上传] 网格 {} shape {:?} ({:?})，{} 字节",
        grid_id, shape, kind, size
    );

    HttpResponse::Ok().json(UploadResponse {
        grid_id,
        shape,
        kind,
    })
}

#[delete("/grids/{grid_id}")]
pub async fn delete_grid(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let grid_id = path.into_inner();
    match data.grid_store.remove(&grid_id) {
        Some(_) => HttpResponse::Ok().json(serde_json::json!({
            "grid_id": grid_id,
            "removed": true,
        })),
        None => RequestError::NotFound(format!("grid_id {}", grid_id)).into_response(),
    }
}
