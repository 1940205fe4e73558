pub mod background;
pub mod cache_aside;
pub mod group_cache_manager;
pub mod group_mutation_manager;
pub mod permission;
