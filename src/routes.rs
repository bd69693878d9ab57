use actix_web::web;

use crate::handlers;

/// 统一注册 HTTP 路由，方便集中管理
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(handlers::hello)
        .service(handlers::integrate_file)
        .service(handlers::file_shape)
        .service(handlers::upload_grid)
        .service(handlers::integrate_stored_grid)
        .service(handlers::delete_grid);
}
