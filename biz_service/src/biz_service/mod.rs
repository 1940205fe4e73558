pub mod group_store;
pub mod group_user_service;
pub mod mysql_group_store;
