use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use log::info;

use voxel_integral::app_state::AppState;
use voxel_integral::config::ServiceConfig;
use voxel_integral::grid_store::GridStore;
use voxel_integral::parser_registry::ParserRegistry;
use voxel_integral::{routes, startup};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    startup::init();
    let config = ServiceConfig::load();

    // 初始化解析器注册表
    let parser_registry = Arc::new(ParserRegistry::new());
    info!("已注册的解析器:");
    for ext in parser_registry.supported_extensions() {
        info!("  - .{}", ext);
    }

    let grid_store = Arc::new(GridStore::with_ttl(config.grid_ttl()));
    let app_state = web::Data::new(AppState {
        parser_registry,
        resource_dir: config.resource_dir.clone(),
        grid_store: grid_store.clone(),
        max_decoded_bytes: config.max_decoded_bytes,
    });

    // 启动后台清理任务：定期清理过期的上传网格
    let cleanup_store = grid_store.clone();
    let cleanup_interval = config.cleanup_interval();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            let cleaned_count = cleanup_store.cleanup_expired();
            if cleaned_count > 0 {
                info!(
                    "[清理任务] 清理了 {} 个过期网格，当前剩余: {} 个网格",
                    cleaned_count,
                    cleanup_store.grid_count()
                );
            }
        }
    });

    info!(
        "服务器启动在 http://{}:{}",
        config.bind_host, config.bind_port
    );
    info!("资源目录: {}", config.resource_dir);
    info!("网格 TTL: {} 分钟", grid_store.default_ttl().as_secs() / 60);

    let max_upload_bytes = config.max_upload_bytes;
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .configure(routes::configure)
    })
    .bind((config.bind_host.as_str(), config.bind_port))?
    .run()
    .await
}
