use crate::biz_service::group_store::GroupStore;
use crate::entitys::group_entity::GroupPublicInfo;
use crate::entitys::group_member::{GroupMember, GroupRole};
use crate::entitys::snapshot::MembershipSnapshot;
use crate::errors::GroupUserError;
use crate::manager::background::BackgroundTasks;
use crate::manager::cache_aside::CacheAsideStore;
use crate::manager::group_cache_manager::GroupCacheManager;
use crate::manager::group_mutation_manager::GroupMutationManager;
use crate::manager::permission::{authorize, authorize_kick, Authorization, GroupAction};
use crate::rpc_client::user_client::UserDirectory;
use common::redis::CacheGateway;
use common::{GroupId, UserId};
use std::sync::Arc;

/// 群成员服务：对外暴露的全部操作
#[derive(Clone)]
pub struct GroupUserService {
    directory: Arc<dyn UserDirectory>,
    groups: GroupCacheManager,
    mutations: GroupMutationManager,
}

impl GroupUserService {
    /// 需在 tokio 运行时内创建
    pub fn new(
        store: Arc<dyn GroupStore>,
        cache: Arc<dyn CacheGateway>,
        directory: Arc<dyn UserDirectory>,
        tasks: BackgroundTasks,
        password_salt: String,
    ) -> Self {
        let groups = GroupCacheManager::new(CacheAsideStore::new(cache), store.clone(), directory.clone(), tasks.clone());
        let mutations = GroupMutationManager::new(store, groups.clone(), tasks, password_salt);
        Self { directory, groups, mutations }
    }

    /// 等待后台回写、失效与补偿全部完成（停机与测试使用）
    pub async fn settle(&self) {
        self.groups.settle().await;
    }

    async fn username_of(&self, uid: UserId) -> Result<String, GroupUserError> {
        self.directory.username_by_uid(uid).await.map_err(GroupUserError::query)
    }

    /// 读取成员快照，空快照视为群不存在
    async fn load_members(&self, group_id: GroupId) -> Result<MembershipSnapshot, GroupUserError> {
        let snapshot = self.groups.membership(group_id).await?;
        if snapshot.is_empty() {
            return Err(GroupUserError::group_not_found());
        }
        Ok(snapshot)
    }

    fn ensure(auth: Authorization) -> Result<(), GroupUserError> {
        match auth {
            Authorization::Allowed => Ok(()),
            Authorization::PermissionDenied | Authorization::NotAMember => Err(GroupUserError::PermissionDenied),
        }
    }

    /// 解析操作者、读取快照并鉴权，返回操作者用户名与快照
    async fn authorized(
        &self,
        group_id: GroupId,
        uid: UserId,
        action: GroupAction,
    ) -> Result<(String, MembershipSnapshot), GroupUserError> {
        let username = self.username_of(uid).await?;
        let snapshot = self.load_members(group_id).await?;
        Self::ensure(authorize(&snapshot, &username, action.allowed_roles()))?;
        Ok((username, snapshot))
    }

    pub async fn get_groups_by_uid(&self, uid: UserId) -> Result<Vec<GroupId>, GroupUserError> {
        Ok(self.groups.groups_of_user(uid).await?.groups)
    }

    pub async fn get_group_public_info(&self, group_id: GroupId) -> Result<GroupPublicInfo, GroupUserError> {
        self.groups.public_info(group_id).await?.ok_or_else(GroupUserError::group_not_found)
    }

    /// 群成员列表，仅群内成员可查看
    pub async fn get_group_info(&self, group_id: GroupId, uid: UserId) -> Result<Vec<GroupMember>, GroupUserError> {
        let (_, snapshot) = self.authorized(group_id, uid, GroupAction::ViewMembers).await?;
        Ok(snapshot.members)
    }

    pub async fn join_group(&self, group_id: GroupId, uid: UserId, password: &str) -> Result<(), GroupUserError> {
        self.mutations.verify_password(group_id, password).await?;
        let username = self.username_of(uid).await?;
        self.mutations.join_group(group_id, uid, &username).await
    }

    pub async fn invite_group(&self, group_id: GroupId, uid: UserId, target: &str) -> Result<(), GroupUserError> {
        let username = self.username_of(uid).await?;
        if !self.directory.has_username(target).await.map_err(GroupUserError::query)? {
            return Err(GroupUserError::user_not_found());
        }
        let snapshot = self.load_members(group_id).await?;
        Self::ensure(authorize(&snapshot, &username, GroupAction::Invite.allowed_roles()))?;
        if snapshot.find(target).is_some() {
            return Err(GroupUserError::AlreadyInGroup);
        }
        self.mutations.invite_member(group_id, target).await
    }

    pub async fn create_group(&self, uid: UserId, name: &str) -> Result<GroupId, GroupUserError> {
        let username = self.username_of(uid).await?;
        self.mutations.create_group(uid, &username, name).await
    }

    /// 修改成员身份，仅群主可操作；群主不在可修改对象之列，目标为自己时按找不到用户处理
    pub async fn set_user_type(
        &self,
        group_id: GroupId,
        uid: UserId,
        target: &str,
        role: GroupRole,
    ) -> Result<(), GroupUserError> {
        let (username, snapshot) = self.authorized(group_id, uid, GroupAction::SetUserType).await?;
        if username == target || snapshot.find(target).is_none() {
            return Err(GroupUserError::user_not_found());
        }
        self.mutations.set_role(group_id, target, role).await
    }

    pub async fn change_group_name(&self, group_id: GroupId, uid: UserId, name: &str) -> Result<(), GroupUserError> {
        self.authorized(group_id, uid, GroupAction::ChangeName).await?;
        self.mutations.rename(group_id, name).await
    }

    pub async fn change_group_password(&self, group_id: GroupId, uid: UserId, password: &str) -> Result<(), GroupUserError> {
        self.authorized(group_id, uid, GroupAction::ChangePassword).await?;
        self.mutations.change_password(group_id, password).await
    }

    /// 踢出成员；成员踢自己即退群
    pub async fn kick_user(&self, group_id: GroupId, uid: UserId, target: &str) -> Result<(), GroupUserError> {
        let username = self.username_of(uid).await?;
        let snapshot = self.load_members(group_id).await?;
        Self::ensure(authorize_kick(&snapshot, &username, target))?;
        if snapshot.find(target).is_none() {
            return Err(GroupUserError::user_not_found());
        }
        let target_uid = (username == target).then_some(uid);
        self.mutations.remove_member(group_id, target, target_uid).await
    }
}

#[cfg(test)]
mod tests {
    use crate::entitys::group_member::{GroupMember, GroupRole};
    use crate::entitys::snapshot::{CacheValue, MembershipSnapshot};
    use crate::errors::{GroupUserError, ResultCode};
    use crate::manager::group_cache_manager::GroupCacheManager;
    use crate::testing::{TEST_SALT, TestEnv};
    use common::util::common_utils::build_password_hash;

    const USERS: &[(i32, &str)] = &[(1, "alice"), (2, "bob"), (3, "carol"), (7, "grace")];

    fn code<T: std::fmt::Debug>(result: Result<T, GroupUserError>) -> ResultCode {
        match result {
            Ok(_) => ResultCode::Success,
            Err(e) => e.code(),
        }
    }

    /// 群 42：alice 为群主，bob 为成员，密码 "secret"
    fn seed_group_42(env: &TestEnv) {
        env.store.seed_group(
            42,
            "Team42",
            &build_password_hash("secret", TEST_SALT),
            &[("alice", GroupRole::Owner), ("bob", GroupRole::Member)],
        );
    }

    #[tokio::test]
    async fn test_create_group_then_owner_is_only_member() {
        let env = TestEnv::new(USERS);
        let group_id = env.service.create_group(7, "Team").await.unwrap();

        let members = env.service.get_group_info(group_id, 7).await.unwrap();
        assert_eq!(members, vec![GroupMember::new("grace", GroupRole::Owner)]);

        let info = env.service.get_group_public_info(group_id).await.unwrap();
        assert_eq!(info.name, "Team");
        assert_eq!(info.id, group_id);

        // 新群没有密码：空密码可以加入
        env.service.join_group(group_id, 2, "").await.unwrap();
        env.service.settle().await;
        assert_eq!(env.service.get_groups_by_uid(7).await.unwrap(), vec![group_id]);
        assert_eq!(env.service.get_groups_by_uid(2).await.unwrap(), vec![group_id]);
    }

    #[tokio::test]
    async fn test_create_group_compensates_failed_owner_insert() {
        let env = TestEnv::new(USERS);
        env.store.fail_member_insert(true);

        let result = env.service.create_group(7, "Team").await;
        assert_eq!(code(result), ResultCode::DatabaseError);

        env.service.settle().await;
        assert_eq!(env.store.group_count(), 0);
    }

    #[tokio::test]
    async fn test_create_group_compensates_rejected_owner_insert() {
        let env = TestEnv::new(USERS);
        env.store.reject_owner_insert(true);

        let result = env.service.create_group(7, "Team").await;
        assert_eq!(code(result), ResultCode::DatabaseError);

        env.service.settle().await;
        assert_eq!(env.store.group_count(), 0);
    }

    #[tokio::test]
    async fn test_create_group_refreshes_cached_group_list() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);
        env.store.seed_group(43, "Other", &build_password_hash("", TEST_SALT), &[("grace", GroupRole::Member)]);
        assert_eq!(env.service.get_groups_by_uid(7).await.unwrap(), vec![43]);
        env.service.settle().await;
        assert!(env.cache.contains(&GroupCacheManager::key_user_groups(7)));

        let group_id = env.service.create_group(7, "Team").await.unwrap();
        env.service.settle().await;
        assert_eq!(env.service.get_groups_by_uid(7).await.unwrap(), vec![43, group_id]);
    }

    #[tokio::test]
    async fn test_join_group_refreshes_cached_group_list() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);
        assert!(env.service.get_groups_by_uid(3).await.unwrap().is_empty());
        env.service.settle().await;
        assert!(env.cache.contains(&GroupCacheManager::key_user_groups(3)));

        env.service.join_group(42, 3, "secret").await.unwrap();
        env.service.settle().await;
        assert_eq!(env.service.get_groups_by_uid(3).await.unwrap(), vec![42]);
    }

    #[tokio::test]
    async fn test_read_started_before_kick_does_not_restore_old_members() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);
        let (loaded, release) = env.store.pause_next_member_load();

        // alice 的读取在踢人前读到旧成员列表，回写被拖到踢人完成之后
        let read = env.service.get_group_info(42, 1);
        let kick = async {
            loaded.await.unwrap();
            env.service.kick_user(42, 1, "bob").await.unwrap();
            env.service.settle().await;
            release.send(()).unwrap();
        };
        let (members, ()) = tokio::join!(read, kick);
        assert_eq!(members.unwrap().len(), 2);
        env.service.settle().await;

        assert!(!env.cache.contains(&GroupCacheManager::key_group_info(42)));
        assert_eq!(code(env.service.get_group_info(42, 2).await), ResultCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_create_group_unknown_caller() {
        let env = TestEnv::new(USERS);
        assert_eq!(code(env.service.create_group(99, "Team").await), ResultCode::QueryError);
        assert_eq!(env.store.group_count(), 0);
    }

    #[tokio::test]
    async fn test_kick_scenario() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);
        let key = GroupCacheManager::key_group_info(42);

        // 成员不能踢群主
        assert_eq!(code(env.service.kick_user(42, 2, "alice").await), ResultCode::PermissionDenied);
        env.service.settle().await;
        assert!(env.cache.contains(&key));

        env.service.kick_user(42, 1, "bob").await.unwrap();
        assert_eq!(env.store.members_of(42), vec![GroupMember::new("alice", GroupRole::Owner)]);
        env.service.settle().await;
        assert!(!env.cache.contains(&key));

        assert_eq!(code(env.service.get_group_info(42, 2).await), ResultCode::PermissionDenied);
        assert_eq!(code(env.service.kick_user(42, 1, "bob").await), ResultCode::NotFound);
    }

    #[tokio::test]
    async fn test_self_kick_leaves_group() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);
        assert_eq!(env.service.get_groups_by_uid(2).await.unwrap(), vec![42]);

        env.service.kick_user(42, 2, "bob").await.unwrap();
        env.service.settle().await;
        assert!(env.service.get_groups_by_uid(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_join_group_password_and_duplicates() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);

        assert_eq!(code(env.service.join_group(42, 3, "wrong").await), ResultCode::PasswordIncorrect);
        assert_eq!(code(env.service.join_group(43, 3, "secret").await), ResultCode::NotFound);
        env.service.join_group(42, 3, "secret").await.unwrap();
        assert_eq!(code(env.service.join_group(42, 3, "secret").await), ResultCode::AlreadyInGroup);

        env.service.settle().await;
        let members = env.service.get_group_info(42, 3).await.unwrap();
        assert_eq!(members.last(), Some(&GroupMember::new("carol", GroupRole::Member)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_join_succeeds_once() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);

        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = env.service.clone();
            handles.push(tokio::spawn(async move { service.join_group(42, 3, "secret").await }));
        }
        let codes: Vec<ResultCode> =
            futures::future::join_all(handles).await.into_iter().map(|joined| code(joined.unwrap())).collect();

        assert_eq!(codes.iter().filter(|c| **c == ResultCode::Success).count(), 1);
        assert!(codes.iter().all(|c| matches!(c, ResultCode::Success | ResultCode::AlreadyInGroup)));
        assert_eq!(env.store.members_of(42).iter().filter(|m| m.username == "carol").count(), 1);
    }

    #[tokio::test]
    async fn test_change_password_then_join() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);

        // 先让旧密码进入缓存
        assert_eq!(code(env.service.join_group(42, 3, "new-pass").await), ResultCode::PasswordIncorrect);
        env.service.settle().await;

        assert_eq!(code(env.service.change_group_password(42, 2, "x").await), ResultCode::PermissionDenied);
        env.service.change_group_password(42, 1, "new-pass").await.unwrap();
        env.service.settle().await;

        assert_eq!(code(env.service.join_group(42, 3, "secret").await), ResultCode::PasswordIncorrect);
        env.service.join_group(42, 3, "new-pass").await.unwrap();
    }

    #[tokio::test]
    async fn test_change_name_refreshes_public_info() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);
        assert_eq!(env.service.get_group_public_info(42).await.unwrap().name, "Team42");
        env.service.settle().await;

        assert_eq!(code(env.service.change_group_name(42, 2, "Mine").await), ResultCode::PermissionDenied);
        assert_eq!(code(env.service.change_group_name(42, 3, "Mine").await), ResultCode::PermissionDenied);
        env.service.change_group_name(42, 1, "Renamed").await.unwrap();
        env.service.settle().await;
        assert_eq!(env.service.get_group_public_info(42).await.unwrap().name, "Renamed");
        assert_eq!(code(env.service.get_group_public_info(7).await), ResultCode::NotFound);
    }

    #[tokio::test]
    async fn test_invite_group() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);
        assert!(env.service.get_groups_by_uid(3).await.unwrap().is_empty());

        assert_eq!(code(env.service.invite_group(42, 1, "nobody").await), ResultCode::NotFound);
        assert_eq!(code(env.service.invite_group(42, 3, "grace").await), ResultCode::PermissionDenied);
        assert_eq!(code(env.service.invite_group(42, 2, "alice").await), ResultCode::AlreadyInGroup);
        assert_eq!(code(env.service.invite_group(41, 1, "carol").await), ResultCode::NotFound);

        env.service.invite_group(42, 2, "carol").await.unwrap();
        env.service.settle().await;
        assert_eq!(env.service.get_groups_by_uid(3).await.unwrap(), vec![42]);
        assert!(env.service.get_group_info(42, 3).await.is_ok());
    }

    #[tokio::test]
    async fn test_set_user_type() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);

        assert_eq!(code(env.service.set_user_type(42, 2, "alice", GroupRole::Member).await), ResultCode::PermissionDenied);
        assert_eq!(code(env.service.set_user_type(42, 1, "alice", GroupRole::Member).await), ResultCode::NotFound);
        assert_eq!(code(env.service.set_user_type(42, 1, "carol", GroupRole::Manager).await), ResultCode::NotFound);

        env.service.set_user_type(42, 1, "bob", GroupRole::Manager).await.unwrap();
        env.service.settle().await;
        // 升为管理员后可改群名
        env.service.change_group_name(42, 2, "ByBob").await.unwrap();
    }

    #[tokio::test]
    async fn test_membership_is_served_from_cache() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);

        env.service.get_group_info(42, 1).await.unwrap();
        env.service.settle().await;
        env.service.get_group_info(42, 2).await.unwrap();
        assert_eq!(env.store.member_loads(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_degrades_to_store() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);
        let key = GroupCacheManager::key_group_info(42);
        env.cache.put_raw(&key, vec![0xde, 0xad]);

        let members = env.service.get_group_info(42, 1).await.unwrap();
        assert_eq!(members.len(), 2);
        env.service.settle().await;
        let cached = env.cache.raw(&key).unwrap();
        assert_eq!(MembershipSnapshot::decode(&cached).unwrap().members, members);
    }

    #[tokio::test]
    async fn test_failing_cache_does_not_change_results() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);
        env.cache.set_failing(true);

        env.service.join_group(42, 3, "secret").await.unwrap();
        env.service.kick_user(42, 1, "bob").await.unwrap();
        env.service.settle().await;
        let names: Vec<String> = env.service.get_group_info(42, 1).await.unwrap().into_iter().map(|m| m.username).collect();
        assert_eq!(names, vec!["alice", "carol"]);
        assert_eq!(env.service.get_groups_by_uid(3).await.unwrap(), vec![42]);
    }

    #[tokio::test]
    async fn test_collaborator_failures_map_to_codes() {
        let env = TestEnv::new(USERS);
        seed_group_42(&env);

        env.directory.set_failing(true);
        assert_eq!(code(env.service.get_group_info(42, 1).await), ResultCode::QueryError);
        assert_eq!(code(env.service.get_groups_by_uid(1).await), ResultCode::QueryError);
        env.directory.set_failing(false);

        env.store.set_failing(true);
        assert_eq!(code(env.service.get_group_info(42, 1).await), ResultCode::DatabaseError);
        assert_eq!(code(env.service.get_group_public_info(42).await), ResultCode::DatabaseError);
        assert_eq!(code(env.service.create_group(1, "x").await), ResultCode::DatabaseError);
    }

    #[tokio::test]
    async fn test_unknown_group_is_not_found() {
        let env = TestEnv::new(USERS);
        assert_eq!(code(env.service.get_group_info(5, 1).await), ResultCode::NotFound);
        assert_eq!(code(env.service.kick_user(5, 1, "bob").await), ResultCode::NotFound);
        assert_eq!(code(env.service.change_group_name(5, 1, "x").await), ResultCode::NotFound);
        env.service.settle().await;
        assert!(!env.cache.contains(&GroupCacheManager::key_group_info(5)));
    }
}
