pub mod category_fetch_fl;
