pub mod statline_fl;
