pub mod group_entity;
pub mod group_member;
pub mod snapshot;
