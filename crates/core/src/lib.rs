//! # Terroir Core
//!
//! Core types, traits and I/O shared by the terroir site-matching crates.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced raster grid
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `TimeSeries`: Daily vegetation-index series with missing samples
//! - `SeriesProvider` / `Site`: the boundary to whatever supplies series
//! - Algorithm trait for a consistent API
//! - GeoTIFF I/O for `f64` rasters

pub mod error;
pub mod io;
pub mod raster;
pub mod series;

pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use series::{SeriesProvider, Site, TimeSeries, DAYS_PER_YEAR};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::series::{SeriesProvider, Site, TimeSeries, DAYS_PER_YEAR};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in terroir.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
