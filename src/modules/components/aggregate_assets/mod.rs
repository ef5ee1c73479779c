pub mod aggregate_assets_fl;
pub mod components;
