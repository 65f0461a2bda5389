pub mod cross_chunk_links;
pub mod determine_export_mode;
pub mod pre_render;
