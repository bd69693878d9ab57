use actix_web::{HttpResponse, Responder, get, web};

use crate::app_state::AppState;

/// 根路径健康检查/服务说明
#[get("/")]
pub async fn hello(data: web::Data<AppState>) -> impl Responder {
    let supported = data.parser_registry.supported_extensions();
    HttpResponse::Ok().json(serde_json::json!({
        "message": "体素网格积分服务",
        "endpoints": [
            "GET /integrate?file=<filename>&dx=<dx>&dy=<dy>&dz=<dz>",
            "GET /shape?file=<filename>",
            "POST /grids",
            "GET /grids/{grid_id}/integrate?dx=<dx>&dy=<dy>&dz=<dz>",
            "DELETE /grids/{grid_id}",
        ],
        "supported_extensions": supported,
        "resource_dir": data.resource_dir,
        "stored_grids": data.grid_store.grid_count(),
    }))
}
