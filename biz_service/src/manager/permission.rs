use crate::entitys::group_member::GroupRole;
use crate::entitys::snapshot::MembershipSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Allowed,
    PermissionDenied,
    /// 操作者不在群内
    NotAMember,
}

/// 需要鉴权的群操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAction {
    ViewMembers,
    Invite,
    ChangeName,
    ChangePassword,
    SetUserType,
    Kick,
}

const ANY_MEMBER: &[GroupRole] = &[GroupRole::Owner, GroupRole::Manager, GroupRole::Member, GroupRole::Other];
const OWNER_OR_MANAGER: &[GroupRole] = &[GroupRole::Owner, GroupRole::Manager];
const OWNER_ONLY: &[GroupRole] = &[GroupRole::Owner];

impl GroupAction {
    pub fn allowed_roles(self) -> &'static [GroupRole] {
        match self {
            GroupAction::ViewMembers | GroupAction::Invite => ANY_MEMBER,
            GroupAction::ChangeName | GroupAction::ChangePassword | GroupAction::Kick => OWNER_OR_MANAGER,
            GroupAction::SetUserType => OWNER_ONLY,
        }
    }
}

pub fn role_of(snapshot: &MembershipSnapshot, username: &str) -> Option<GroupRole> {
    snapshot.find(username).map(|member| member.role)
}

pub fn authorize(snapshot: &MembershipSnapshot, acting: &str, allowed: &[GroupRole]) -> Authorization {
    match role_of(snapshot, acting) {
        None => Authorization::NotAMember,
        Some(role) if allowed.contains(&role) => Authorization::Allowed,
        Some(_) => Authorization::PermissionDenied,
    }
}

/// 踢人：群成员踢自己（退群）总是允许，否则需要群主或管理员
pub fn authorize_kick(snapshot: &MembershipSnapshot, acting: &str, target: &str) -> Authorization {
    if acting == target && role_of(snapshot, acting).is_some() {
        return Authorization::Allowed;
    }
    authorize(snapshot, acting, GroupAction::Kick.allowed_roles())
}
