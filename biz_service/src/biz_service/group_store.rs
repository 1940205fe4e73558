use crate::entitys::group_entity::{GroupPublicInfo, GroupRecord};
use crate::entitys::group_member::{GroupMember, GroupRole};
use async_trait::async_trait;
use common::errors::AppError;
use common::GroupId;

/// 群与成员的权威存储，每次写操作独立提交
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// 用户所在的全部群 ID
    async fn list_groups_of_user(&self, username: &str) -> Result<Vec<GroupId>, AppError>;

    async fn find_public_info(&self, group_id: GroupId) -> Result<Option<GroupPublicInfo>, AppError>;

    /// 群成员，按入群顺序
    async fn list_members(&self, group_id: GroupId) -> Result<Vec<GroupMember>, AppError>;

    async fn find_password_hash(&self, group_id: GroupId) -> Result<Option<String>, AppError>;

    /// 写入群记录，返回新分配的群 ID
    async fn insert_group(&self, group: &GroupRecord) -> Result<GroupId, AppError>;

    /// 写入成员记录；(group_id, username) 已存在时不写入并返回 `false`
    async fn insert_member(&self, group_id: GroupId, username: &str, role: GroupRole) -> Result<bool, AppError>;

    async fn delete_group(&self, group_id: GroupId) -> Result<(), AppError>;

    async fn update_member_role(&self, group_id: GroupId, username: &str, role: GroupRole) -> Result<(), AppError>;

    async fn delete_member(&self, group_id: GroupId, username: &str) -> Result<(), AppError>;

    async fn update_group_name(&self, group_id: GroupId, name: &str) -> Result<(), AppError>;

    async fn update_group_password(&self, group_id: GroupId, password_hash: &str) -> Result<(), AppError>;
}
