use actix_web::{HttpResponse, Responder, get, web};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::handlers::errors::RequestError;
use crate::handlers::integrate::resolve_resource;
use crate::parser_registry::ParserRegistry;

#[derive(Deserialize)]
pub struct ShapeQuery {
    pub file: String,
}

#[derive(Serialize)]
pub struct ShapeResponse {
    pub file: String,
    pub parser: &'static str,
    pub shape: Vec<usize>,
}

/// 只读文件头，返回网格的 shape
/// 例如: /shape?file=CHGDIFF.vasp
#[get("/shape")]
pub async fn file_shape(
    data: web::Data<AppState>,
    query: web::Query<ShapeQuery>,
) -> impl Responder {
    let file = query.into_inner().file;
    let registry = data.parser_registry.clone();
    let resource_dir = data.resource_dir.clone();

    let outcome = web::block(move || run_file_shape(&registry, &resource_dir, file)).await;
    match outcome.map_err(RequestError::from).and_then(|r| r) {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(err) => err.into_response(),
    }
}

pub fn run_file_shape(
    registry: &ParserRegistry,
    resource_dir: &str,
    file: String,
) -> Result<ShapeResponse, RequestError> {
    let (file_path, parser) = resolve_resource(registry, resource_dir, &file)?;
    let shape = parser.read_shape(&file_path)?;
    Ok(ShapeResponse {
        file,
        parser: parser.name(),
        shape,
    })
}
