//! 内存版缓存、存储与用户目录，带故障开关，供单元测试使用。

use crate::biz_service::group_store::GroupStore;
use crate::biz_service::group_user_service::GroupUserService;
use crate::entitys::group_entity::{GroupPublicInfo, GroupRecord};
use crate::entitys::group_member::{GroupMember, GroupRole};
use crate::manager::background::BackgroundTasks;
use crate::rpc_client::user_client::UserDirectory;
use async_trait::async_trait;
use common::errors::AppError;
use common::redis::CacheGateway;
use common::{GroupId, UserId};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub const TEST_SALT: &str = "test-salt";

fn injected(what: &str) -> AppError {
    AppError::Internal(format!("injected {} failure", what))
}

#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, Vec<u8>>,
    failing: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 打开后所有读写都返回错误
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn put_raw(&self, key: &str, value: Vec<u8>) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).map(|v| v.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) { Err(injected("cache")) } else { Ok(()) }
    }
}

#[async_trait]
impl CacheGateway for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        self.check()?;
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), AppError> {
        self.check()?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.check()?;
        self.entries.remove(key);
        Ok(())
    }
}

#[derive(Default)]
struct StoreState {
    last_id: GroupId,
    groups: BTreeMap<GroupId, (GroupRecord, i64)>,
    /// (群, 用户名, 身份)，按写入顺序
    members: Vec<(GroupId, String, GroupRole)>,
}

#[derive(Default)]
pub struct MemoryGroupStore {
    state: Mutex<StoreState>,
    failing: AtomicBool,
    fail_member_insert: AtomicBool,
    reject_owner_insert: AtomicBool,
    member_loads: AtomicUsize,
    member_gate: Mutex<Option<(oneshot::Sender<()>, oneshot::Receiver<()>)>>,
}

impl MemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 打开后所有读写都返回错误
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// 打开后写入成员记录失败（用于建群补偿）
    pub fn fail_member_insert(&self, failing: bool) {
        self.fail_member_insert.store(failing, Ordering::SeqCst);
    }

    /// 打开后写入群主记录时返回未写入（`Ok(false)`）
    pub fn reject_owner_insert(&self, rejecting: bool) {
        self.reject_owner_insert.store(rejecting, Ordering::SeqCst);
    }

    /// 下一次 `list_members` 读完数据后暂停：先通知返回的接收端，再等待发送端放行
    pub fn pause_next_member_load(&self) -> (oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (loaded_tx, loaded_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        *self.member_gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some((loaded_tx, release_rx));
        (loaded_rx, release_tx)
    }

    /// 直接写入一个群及其成员
    pub fn seed_group(&self, group_id: GroupId, name: &str, password_hash: &str, members: &[(&str, GroupRole)]) {
        let mut state = self.lock();
        let record = GroupRecord {
            name: name.to_string(),
            password: password_hash.to_string(),
            owner_uid: 0,
            create_time: 1_700_000_000,
        };
        state.groups.insert(group_id, (record, 1_700_000_000));
        state.last_id = state.last_id.max(group_id);
        for (username, role) in members {
            state.members.push((group_id, username.to_string(), *role));
        }
    }

    pub fn group_count(&self) -> usize {
        self.lock().groups.len()
    }

    pub fn members_of(&self, group_id: GroupId) -> Vec<GroupMember> {
        self.lock()
            .members
            .iter()
            .filter(|(g, _, _)| *g == group_id)
            .map(|(_, name, role)| GroupMember::new(name.clone(), *role))
            .collect()
    }

    /// `list_members` 被调用的次数
    pub fn member_loads(&self) -> usize {
        self.member_loads.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) { Err(injected("store")) } else { Ok(()) }
    }
}

#[async_trait]
impl GroupStore for MemoryGroupStore {
    async fn list_groups_of_user(&self, username: &str) -> Result<Vec<GroupId>, AppError> {
        self.check()?;
        let mut groups: Vec<GroupId> =
            self.lock().members.iter().filter(|(_, name, _)| name == username).map(|(g, _, _)| *g).collect();
        groups.sort_unstable();
        Ok(groups)
    }

    async fn find_public_info(&self, group_id: GroupId) -> Result<Option<GroupPublicInfo>, AppError> {
        self.check()?;
        Ok(self
            .lock()
            .groups
            .get(&group_id)
            .map(|(record, created_at)| GroupPublicInfo { id: group_id, name: record.name.clone(), created_at: *created_at }))
    }

    async fn list_members(&self, group_id: GroupId) -> Result<Vec<GroupMember>, AppError> {
        self.check()?;
        self.member_loads.fetch_add(1, Ordering::SeqCst);
        let members = self.members_of(group_id);
        let gate = self.member_gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).take();
        if let Some((loaded, release)) = gate {
            let _ = loaded.send(());
            let _ = release.await;
        }
        Ok(members)
    }

    async fn find_password_hash(&self, group_id: GroupId) -> Result<Option<String>, AppError> {
        self.check()?;
        Ok(self.lock().groups.get(&group_id).map(|(record, _)| record.password.clone()))
    }

    async fn insert_group(&self, group: &GroupRecord) -> Result<GroupId, AppError> {
        self.check()?;
        let mut state = self.lock();
        state.last_id += 1;
        let id = state.last_id;
        state.groups.insert(id, (group.clone(), group.create_time));
        Ok(id)
    }

    async fn insert_member(&self, group_id: GroupId, username: &str, role: GroupRole) -> Result<bool, AppError> {
        self.check()?;
        if self.fail_member_insert.load(Ordering::SeqCst) {
            return Err(injected("member insert"));
        }
        if role == GroupRole::Owner && self.reject_owner_insert.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let mut state = self.lock();
        if state.members.iter().any(|(g, name, _)| *g == group_id && name == username) {
            return Ok(false);
        }
        state.members.push((group_id, username.to_string(), role));
        Ok(true)
    }

    async fn delete_group(&self, group_id: GroupId) -> Result<(), AppError> {
        self.check()?;
        self.lock().groups.remove(&group_id);
        Ok(())
    }

    async fn update_member_role(&self, group_id: GroupId, username: &str, role: GroupRole) -> Result<(), AppError> {
        self.check()?;
        let mut state = self.lock();
        for member in state.members.iter_mut().filter(|(g, name, _)| *g == group_id && name == username) {
            member.2 = role;
        }
        Ok(())
    }

    async fn delete_member(&self, group_id: GroupId, username: &str) -> Result<(), AppError> {
        self.check()?;
        self.lock().members.retain(|(g, name, _)| !(*g == group_id && name == username));
        Ok(())
    }

    async fn update_group_name(&self, group_id: GroupId, name: &str) -> Result<(), AppError> {
        self.check()?;
        if let Some((record, _)) = self.lock().groups.get_mut(&group_id) {
            record.name = name.to_string();
        }
        Ok(())
    }

    async fn update_group_password(&self, group_id: GroupId, password_hash: &str) -> Result<(), AppError> {
        self.check()?;
        if let Some((record, _)) = self.lock().groups.get_mut(&group_id) {
            record.password = password_hash.to_string();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct StaticDirectory {
    users: DashMap<UserId, String>,
    failing: AtomicBool,
}

impl StaticDirectory {
    pub fn with_users(users: &[(UserId, &str)]) -> Self {
        let directory = Self::default();
        for (uid, name) in users {
            directory.users.insert(*uid, name.to_string());
        }
        directory
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) { Err(injected("directory")) } else { Ok(()) }
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn username_by_uid(&self, uid: UserId) -> Result<String, AppError> {
        self.check()?;
        self.users.get(&uid).map(|name| name.clone()).ok_or_else(|| AppError::Internal(format!("unknown uid {}", uid)))
    }

    async fn uid_by_username(&self, username: &str) -> Result<UserId, AppError> {
        self.check()?;
        self.users
            .iter()
            .find(|entry| entry.value() == username)
            .map(|entry| *entry.key())
            .ok_or_else(|| AppError::Internal(format!("unknown username {}", username)))
    }

    async fn has_username(&self, username: &str) -> Result<bool, AppError> {
        self.check()?;
        Ok(self.users.iter().any(|entry| entry.value() == username))
    }
}

/// 组装好的测试环境
pub struct TestEnv {
    pub cache: Arc<MemoryCache>,
    pub store: Arc<MemoryGroupStore>,
    pub directory: Arc<StaticDirectory>,
    pub service: GroupUserService,
}

impl TestEnv {
    /// 需在 tokio 运行时内调用
    pub fn new(users: &[(UserId, &str)]) -> Self {
        let cache = Arc::new(MemoryCache::new());
        let store = Arc::new(MemoryGroupStore::new());
        let directory = Arc::new(StaticDirectory::with_users(users));
        let service = GroupUserService::new(
            store.clone(),
            cache.clone(),
            directory.clone(),
            BackgroundTasks::new(),
            TEST_SALT.to_string(),
        );
        Self { cache, store, directory, service }
    }
}
