//! 三维网格黎曼和积分，以及围绕它的体素网格积分服务

pub mod app_state;
pub mod codec;
pub mod config;
pub mod error;
pub mod grid_store;
pub mod handlers;
pub mod integrator;
pub mod parser_registry;
pub mod parsers;
pub mod routes;
pub mod startup;
pub mod utils;
pub mod voxel_grid;

pub use error::{ArgumentError, GridError, ShapeError};
pub use integrator::{IntegralResult, Sample, SampleGrid, Steps, integrate, integrate_with};
pub use voxel_grid::{VoxelData, VoxelGrid};
