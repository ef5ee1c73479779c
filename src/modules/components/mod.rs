pub mod aggregate_assets;
pub mod category_fetch;
pub mod download_assets;
pub mod scratch_dir;
pub mod sort_assets;
pub mod statline;
pub mod video_compilation;
