use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use actix_web::{HttpResponse, Responder, get, web};
use log::info;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::error::{ArgumentError, GridError};
use crate::handlers::errors::RequestError;
use crate::handlers::steps::StepsQuery;
use crate::integrator::{IntegralResult, Steps, integrate_with};
use crate::parser_registry::ParserRegistry;
use crate::utils::parser::VoxelGridParser;

#[derive(Deserialize)]
pub struct IntegrateFileQuery {
    /// 文件名，例如 "CHGDIFF.vasp"
    pub file: String,
    pub dx: Option<f64>,
    pub dy: Option<f64>,
    pub dz: Option<f64>,
}

#[derive(Serialize)]
pub struct IntegrateFileResponse {
    pub file: String,
    pub parser: &'static str,
    pub shape: Vec<usize>,
    pub steps: Steps,
    pub result: IntegralResult,
}

/// 积分资源目录下的网格文件，根据扩展名自动选择解析器
/// 例如: /integrate?file=CHGDIFF.vasp&dx=0.1&dy=0.1&dz=0.1
#[get("/integrate")]
pub async fn integrate_file(
    data: web::Data<AppState>,
    query: web::Query<IntegrateFileQuery>,
) -> impl Responder {
    let query = query.into_inner();
    let registry = data.parser_registry.clone();
    let resource_dir = data.resource_dir.clone();

    let outcome = web::block(move || run_integrate_file(&registry, &resource_dir, query)).await;
    match outcome.map_err(RequestError::from).and_then(|r| r) {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(err) => err.into_response(),
    }
}

/// 解析文件并积分
///
/// ## 流程
/// 1. 校验文件名，只允许资源目录下的文件
/// 2. 根据扩展名查找解析器
/// 3. 完整解析文件
/// 4. 确定步长：查询参数优先，否则使用文件自带的默认步长
/// 5. 积分
pub fn run_integrate_file(
    registry: &ParserRegistry,
    resource_dir: &str,
    query: IntegrateFileQuery,
) -> Result<IntegrateFileResponse, RequestError> {
    let file = query.file;
    let (file_path, parser) = resolve_resource(registry, resource_dir, &file)?;

    let parse_start = Instant::now();
    let grid = parser.parse(&file_path)?;
    let steps_query = StepsQuery {
        dx: query.dx,
        dy: query.dy,
        dz: query.dz,
    };
    let steps = steps_query.resolve(grid.default_steps(), &file)?;
    let result = integrate_with(&grid.view(), steps).map_err(GridError::from)?;

    info!(
        "[积分] 文件 {} ({}) shape {:?}，耗时 {}ms",
        file,
        parser.name(),
        grid.shape(),
        parse_start.elapsed().as_millis()
    );

    Ok(IntegrateFileResponse {
        parser: parser.name(),
        shape: grid.shape().to_vec(),
        file,
        steps,
        result,
    })
}

/// 文件名只能是资源目录下的单个路径段
pub(super) fn resolve_resource<'r>(
    registry: &'r ParserRegistry,
    resource_dir: &str,
    file: &str,
) -> Result<(PathBuf, &'r dyn VoxelGridParser), RequestError> {
    if Path::new(file).file_name().and_then(|name| name.to_str()) != Some(file) {
        return Err(ArgumentError::InvalidFileName(file.to_string()).into());
    }
    let parser = registry
        .parser_for(Path::new(file))
        .map_err(RequestError::from)?;
    Ok((Path::new(resource_dir).join(file), parser))
}

#[derive(Serialize)]
pub struct IntegrateGridResponse {
    pub grid_id: String,
    pub shape: Vec<usize>,
    pub steps: Steps,
    pub result: IntegralResult,
}

/// 积分已上传的网格，必须提供步长
#[get("/grids/{grid_id}/integrate")]
pub async fn integrate_stored_grid(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<StepsQuery>,
) -> impl Responder {
    let grid_id = path.into_inner();
    let Some(stored) = data.grid_store.get(&grid_id) else {
        return RequestError::NotFound(format!("grid_id {}", grid_id)).into_response();
    };
    let steps = match query.resolve(None, &grid_id) {
        Ok(steps) => steps,
        Err(err) => return RequestError::from(err).into_response(),
    };

    // 网格以 Arc 持有，积分期间不占用存储锁
    let grid = Arc::clone(&stored);
    let outcome = web::block(move || integrate_with(&grid.grid.view(), steps)).await;
    match outcome {
        Ok(Ok(result)) => HttpResponse::Ok().json(IntegrateGridResponse {
            grid_id,
            shape: stored.grid.shape().to_vec(),
            steps,
            result,
        }),
        Ok(Err(shape_err)) => RequestError::from(GridError::from(shape_err)).into_response(),
        Err(err) => RequestError::from(err).into_response(),
    }
}
