pub mod download_assets_fl;
