pub mod banner;
pub mod item_table;
pub mod table_renderer;
