use crate::biz_service::group_store::GroupStore;
use crate::entitys::group_entity::GroupRecord;
use crate::entitys::group_member::GroupRole;
use crate::errors::GroupUserError;
use crate::manager::background::BackgroundTasks;
use crate::manager::group_cache_manager::GroupCacheManager;
use common::util::common_utils::build_password_hash;
use common::util::date_util::now;
use common::{GroupId, UserId};
use log::{info, warn};
use std::sync::Arc;

/// 群写操作：落库、失败补偿、缓存失效
#[derive(Clone)]
pub struct GroupMutationManager {
    store: Arc<dyn GroupStore>,
    groups: GroupCacheManager,
    tasks: BackgroundTasks,
    password_salt: String,
}

impl GroupMutationManager {
    pub fn new(store: Arc<dyn GroupStore>, groups: GroupCacheManager, tasks: BackgroundTasks, password_salt: String) -> Self {
        Self { store, groups, tasks, password_salt }
    }

    pub fn hash_password(&self, password: &str) -> String {
        build_password_hash(password, &self.password_salt)
    }

    /// 建群并写入群主；群主写入失败时后台删除刚建的群
    pub async fn create_group(&self, uid: UserId, username: &str, name: &str) -> Result<GroupId, GroupUserError> {
        let record = GroupRecord {
            name: name.to_string(),
            password: self.hash_password(""),
            owner_uid: uid,
            create_time: now(),
        };
        let group_id = self.store.insert_group(&record).await.map_err(GroupUserError::database)?;

        let failure = match self.store.insert_member(group_id, username, GroupRole::Owner).await {
            Ok(true) => None,
            Ok(false) => Some(GroupUserError::database("owner membership not inserted")),
            Err(e) => Some(GroupUserError::database(e)),
        };
        if let Some(err) = failure {
            self.compensate_create(group_id);
            return Err(err);
        }

        self.groups.invalidate_user_groups(uid);
        info!("group created, id={} owner={}", group_id, username);
        Ok(group_id)
    }

    fn compensate_create(&self, group_id: GroupId) {
        warn!("owner insert failed, removing orphan group {}", group_id);
        let store = self.store.clone();
        self.tasks.spawn(async move {
            if let Err(e) = store.delete_group(group_id).await {
                warn!("orphan group {} not removed: {}", group_id, e);
            }
        });
    }

    /// 校验入群密码，群不存在返回 NotFound
    pub async fn verify_password(&self, group_id: GroupId, password: &str) -> Result<(), GroupUserError> {
        let stored = self.groups.password_hash(group_id).await?.ok_or_else(GroupUserError::group_not_found)?;
        if stored != self.hash_password(password) {
            return Err(GroupUserError::PasswordIncorrect);
        }
        Ok(())
    }

    pub async fn join_group(&self, group_id: GroupId, uid: UserId, username: &str) -> Result<(), GroupUserError> {
        self.add_member(group_id, username).await?;
        self.groups.invalidate_user_groups(uid);
        Ok(())
    }

    pub async fn invite_member(&self, group_id: GroupId, username: &str) -> Result<(), GroupUserError> {
        self.add_member(group_id, username).await?;
        self.groups.invalidate_user_groups_by_name(username);
        Ok(())
    }

    async fn add_member(&self, group_id: GroupId, username: &str) -> Result<(), GroupUserError> {
        let inserted =
            self.store.insert_member(group_id, username, GroupRole::Member).await.map_err(GroupUserError::database)?;
        if !inserted {
            return Err(GroupUserError::AlreadyInGroup);
        }
        self.groups.invalidate_membership(group_id);
        Ok(())
    }

    /// 移除成员；`uid` 已知时直接失效其群列表
    pub async fn remove_member(&self, group_id: GroupId, username: &str, uid: Option<UserId>) -> Result<(), GroupUserError> {
        self.store.delete_member(group_id, username).await.map_err(GroupUserError::database)?;
        self.groups.invalidate_membership(group_id);
        match uid {
            Some(uid) => self.groups.invalidate_user_groups(uid),
            None => self.groups.invalidate_user_groups_by_name(username),
        }
        Ok(())
    }

    pub async fn set_role(&self, group_id: GroupId, username: &str, role: GroupRole) -> Result<(), GroupUserError> {
        self.store.update_member_role(group_id, username, role).await.map_err(GroupUserError::database)?;
        self.groups.invalidate_membership(group_id);
        Ok(())
    }

    pub async fn rename(&self, group_id: GroupId, name: &str) -> Result<(), GroupUserError> {
        self.store.update_group_name(group_id, name).await.map_err(GroupUserError::database)?;
        self.groups.invalidate_public_info(group_id);
        Ok(())
    }

    pub async fn change_password(&self, group_id: GroupId, password: &str) -> Result<(), GroupUserError> {
        let hash = self.hash_password(password);
        self.store.update_group_password(group_id, &hash).await.map_err(GroupUserError::database)?;
        self.groups.invalidate_public_info(group_id);
        self.groups.invalidate_password(group_id);
        Ok(())
    }
}
