//! Library root for the `flightdash` crate.
//!
//! Form input flows through a feature adapter into a trained model; the
//! dashboards bind each adapter to its model and static dataset.

// Core error handling
pub mod api_errors;
pub mod errors;

// Feature alignment
pub mod adapter;
pub mod feature_row;
pub mod form;
pub mod schema;

// Models & inference
pub mod inference;
pub mod model;
pub mod prediction;

// Dashboards
pub mod dashboard;
pub mod price;
pub mod satisfaction;

// Datasets & trends
pub mod dataset;
pub mod trends;

// Configuration & CLI
pub mod cli;
pub mod config_loader;

// Web server interface
pub mod app_state;
pub mod pages;
pub mod web;


pub use adapter::FeatureAdapter;
pub use errors::{DashError, DashResult};
pub use feature_row::{ComputedColumns, FeatureRow};
pub use model::{ModelOutput, Task, TrainedModel};
pub use prediction::{PredictionResponse, PredictionResult};
pub use schema::ExpectedSchema;
