pub mod components;
pub mod video_compilation_fl;
