use crate::biz_service::group_store::GroupStore;
use crate::entitys::group_entity::GroupPublicInfo;
use crate::entitys::snapshot::{GroupsByUserSnapshot, MembershipSnapshot};
use crate::errors::GroupUserError;
use crate::manager::background::BackgroundTasks;
use crate::manager::cache_aside::CacheAsideStore;
use crate::rpc_client::user_client::UserDirectory;
use common::{GroupId, UserId};
use log::debug;
use std::sync::Arc;

/// 群读模型：各类快照的缓存键、回源与失效
#[derive(Clone)]
pub struct GroupCacheManager {
    cache: CacheAsideStore,
    store: Arc<dyn GroupStore>,
    directory: Arc<dyn UserDirectory>,
    tasks: BackgroundTasks,
}

impl GroupCacheManager {
    pub fn new(
        cache: CacheAsideStore,
        store: Arc<dyn GroupStore>,
        directory: Arc<dyn UserDirectory>,
        tasks: BackgroundTasks,
    ) -> Self {
        Self { cache, store, directory, tasks }
    }

    pub fn key_group_info(group_id: GroupId) -> String {
        format!("groupuser:info:{}", group_id)
    }

    pub fn key_user_groups(uid: UserId) -> String {
        format!("groupuser:groups:{}", uid)
    }

    pub fn key_group_public(group_id: GroupId) -> String {
        format!("groupuser:public:{}", group_id)
    }

    pub fn key_group_password(group_id: GroupId) -> String {
        format!("groupuser:password:{}", group_id)
    }

    /// 群成员快照，群不存在时为空
    pub async fn membership(&self, group_id: GroupId) -> Result<MembershipSnapshot, GroupUserError> {
        self.cache
            .fetch_or_load(Self::key_group_info(group_id), move || async move {
                let members = self.store.list_members(group_id).await.map_err(GroupUserError::database)?;
                Ok::<_, GroupUserError>(MembershipSnapshot::new(members))
            })
            .await
    }

    pub async fn groups_of_user(&self, uid: UserId) -> Result<GroupsByUserSnapshot, GroupUserError> {
        self.cache
            .fetch_or_load(Self::key_user_groups(uid), move || async move {
                let username = self.directory.username_by_uid(uid).await.map_err(GroupUserError::query)?;
                let groups = self.store.list_groups_of_user(&username).await.map_err(GroupUserError::database)?;
                Ok::<_, GroupUserError>(GroupsByUserSnapshot { groups })
            })
            .await
    }

    pub async fn public_info(&self, group_id: GroupId) -> Result<Option<GroupPublicInfo>, GroupUserError> {
        self.cache
            .fetch_or_load(Self::key_group_public(group_id), move || async move {
                self.store.find_public_info(group_id).await.map_err(GroupUserError::database)
            })
            .await
    }

    pub async fn password_hash(&self, group_id: GroupId) -> Result<Option<String>, GroupUserError> {
        self.cache
            .fetch_or_load(Self::key_group_password(group_id), move || async move {
                self.store.find_password_hash(group_id).await.map_err(GroupUserError::database)
            })
            .await
    }

    pub fn invalidate_membership(&self, group_id: GroupId) {
        self.cache.invalidate(Self::key_group_info(group_id));
    }

    pub fn invalidate_public_info(&self, group_id: GroupId) {
        self.cache.invalidate(Self::key_group_public(group_id));
    }

    pub fn invalidate_password(&self, group_id: GroupId) {
        self.cache.invalidate(Self::key_group_password(group_id));
    }

    pub fn invalidate_user_groups(&self, uid: UserId) {
        self.cache.invalidate(Self::key_user_groups(uid));
    }

    /// 按用户名失效其群列表，uid 在后台任务中查询
    pub fn invalidate_user_groups_by_name(&self, username: &str) {
        let this = self.clone();
        let username = username.to_string();
        self.tasks.spawn(async move {
            match this.directory.uid_by_username(&username).await {
                Ok(uid) => this.invalidate_user_groups(uid),
                Err(e) => debug!("skip group list invalidation for {}: {}", username, e),
            }
        });
    }

    /// 等待后台查询与缓存命令全部完成
    pub async fn settle(&self) {
        self.tasks.settle().await;
        self.cache.flush().await;
    }
}
