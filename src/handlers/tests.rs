use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use num_complex::Complex64;
use serde_json::{Value, json};

use crate::app_state::AppState;
use crate::codec;
use crate::grid_store::GridStore;
use crate::parser_registry::ParserRegistry;
use crate::routes;
use crate::voxel_grid::{VoxelData, VoxelGrid};

fn app_state() -> web::Data<AppState> {
    app_state_with_limit(codec::DEFAULT_MAX_DECODED_BYTES)
}

fn app_state_with_limit(max_decoded_bytes: usize) -> web::Data<AppState> {
    web::Data::new(AppState {
        parser_registry: Arc::new(ParserRegistry::new()),
        resource_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/test/resource").to_string(),
        grid_store: Arc::new(GridStore::new()),
        max_decoded_bytes,
    })
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state.clone()).configure(routes::configure)).await
    };
}

#[actix_web::test]
async fn root_lists_supported_extensions() {
    let state = app_state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["supported_extensions"], json!(["vasp", "vxg", "vxgz"]));
    assert_eq!(body["stored_grids"], json!(0));
}

#[test_log::test(actix_web::test)]
async fn vasp_file_uses_lattice_steps_by_default() {
    let state = app_state();
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/integrate?file=sample.vasp")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["parser"], json!("VASP Parser"));
    assert_eq!(body["shape"], json!([2, 3, 2]));
    assert_eq!(body["result"]["kind"], json!("real"));
    let value = body["result"]["value"].as_f64().unwrap();
    assert!((value - 1452.0).abs() < 1e-9);
}

#[actix_web::test]
async fn explicit_steps_override_file_defaults() {
    let state = app_state();
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/integrate?file=sample.vasp&dx=1&dy=1&dz=0.5")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["steps"], json!({"dx": 1.0, "dy": 1.0, "dz": 0.5}));
    let value = body["result"]["value"].as_f64().unwrap();
    assert!((value - 363.0).abs() < 1e-9);
}

#[actix_web::test]
async fn file_errors_map_to_status_codes() {
    let state = app_state();
    let app = init_app!(state);

    for (uri, status) in [
        ("/integrate?file=grid.csv", StatusCode::BAD_REQUEST),
        ("/integrate?file=missing.vasp", StatusCode::NOT_FOUND),
        ("/integrate?file=..%2FCargo.toml", StatusCode::BAD_REQUEST),
        ("/integrate?file=sample.vasp&dx=1", StatusCode::BAD_REQUEST),
        ("/integrate?file=sample.vasp&dx=1&dy=NaN&dz=1", StatusCode::BAD_REQUEST),
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "{}", uri);
    }
}

#[test_log::test(actix_web::test)]
async fn uploaded_complex_grid_round_trip() {
    let state = app_state();
    let app = init_app!(state);

    let grid = VoxelGrid::new(
        vec![2, 2, 2],
        VoxelData::Complex(vec![Complex64::new(1.0, 2.0); 8]),
    )
    .unwrap();
    let req = test::TestRequest::post()
        .uri("/grids")
        .set_payload(codec::encode_gzip(&grid).unwrap())
        .to_request();
    let upload: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(upload["kind"], json!("complex"));
    assert_eq!(upload["shape"], json!([2, 2, 2]));
    let grid_id = upload["grid_id"].as_str().unwrap().to_string();
    assert_eq!(state.grid_store.grid_count(), 1);

    let req = test::TestRequest::get()
        .uri(&format!("/grids/{}/integrate?dx=1&dy=1&dz=1", grid_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body["result"],
        json!({"kind": "complex", "re": 8.0, "im": 16.0})
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/grids/{}", grid_id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/grids/{}/integrate?dx=1&dy=1&dz=1", grid_id))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn stored_grid_of_wrong_rank_is_rejected() {
    let state = app_state();
    let app = init_app!(state);

    let grid = VoxelGrid::new(vec![2, 2], VoxelData::Real(vec![1.0; 4])).unwrap();
    let grid_id = state.grid_store.insert(grid);

    let req = test::TestRequest::get()
        .uri(&format!("/grids/{}/integrate?dx=1&dy=1&dz=1", grid_id))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[actix_web::test]
async fn stored_grid_requires_steps() {
    let state = app_state();
    let app = init_app!(state);

    let grid = VoxelGrid::new(vec![1, 1, 1], VoxelData::Real(vec![1.0])).unwrap();
    let grid_id = state.grid_store.insert(grid);

    let req = test::TestRequest::get()
        .uri(&format!("/grids/{}/integrate", grid_id))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn malformed_upload_is_rejected() {
    let state = app_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/grids")
        .set_payload(&b"not a grid"[..])
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(state.grid_store.grid_count(), 0);
}

#[actix_web::test]
async fn upload_over_decoded_limit_is_rejected() {
    let state = app_state_with_limit(4096);
    let app = init_app!(state);

    let grid = VoxelGrid::new(vec![16, 16, 16], VoxelData::Real(vec![0.0; 4096])).unwrap();
    let req = test::TestRequest::post()
        .uri("/grids")
        .set_payload(codec::encode_gzip(&grid).unwrap())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(state.grid_store.grid_count(), 0);
}

#[actix_web::test]
async fn upload_with_unaddressable_shape_is_rejected() {
    let state = app_state();
    let app = init_app!(state);

    let mut payload = Vec::new();
    payload.extend_from_slice(&codec::MAGIC);
    payload.extend_from_slice(&[codec::VERSION, 0, 3]);
    for extent in [0u64, 1 << 62, 4] {
        payload.extend_from_slice(&extent.to_le_bytes());
    }
    let req = test::TestRequest::post()
        .uri("/grids")
        .set_payload(payload)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(state.grid_store.grid_count(), 0);
}

#[actix_web::test]
async fn shape_is_read_without_integrating() {
    let state = app_state();
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/shape?file=sample.vasp")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!({"file": "sample.vasp", "parser": "VASP Parser", "shape": [2, 3, 2]})
    );

    for (uri, status) in [
        ("/shape?file=grid.csv", StatusCode::BAD_REQUEST),
        ("/shape?file=missing.vxg", StatusCode::NOT_FOUND),
        ("/shape?file=..%2Fsample.vasp", StatusCode::BAD_REQUEST),
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "{}", uri);
    }
}
