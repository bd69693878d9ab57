pub mod errors;
pub mod grids;
pub mod health;
pub mod integrate;
pub mod shape;
pub mod steps;

pub use grids::{delete_grid, upload_grid};
pub use health::hello;
pub use integrate::{integrate_file, integrate_stored_grid};
pub use shape::file_shape;

#[cfg(test)]
mod tests;
