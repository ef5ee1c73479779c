pub mod scratch_dir_fl;
