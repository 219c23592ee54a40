use std::{io,time};

use thiserror::Error;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error,Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IO(#[from] io::Error),
    #[error("CSV error: {0}")]
    CSV(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JSON(#[from] serde_json::Error),
    #[error("Request error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    HttpError(reqwest::StatusCode),
    #[error("System Time error: {0}")]
    SystemTime(#[from] time::SystemTimeError),
    /// A required header column (region key, anchor date or filter column)
    /// is absent from the time series table.
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Not a GeoJSON feature collection")]
    NotAFeatureCollection,
    #[error("No data!")]
    MissingData,
}
