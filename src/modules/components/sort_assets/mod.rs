pub mod sort_assets_fl;
