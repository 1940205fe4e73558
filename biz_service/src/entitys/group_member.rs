use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{AsRefStr, Display, EnumString};

/// 群内身份，数值与线上 MemberType 一致，字符串与库表 ENUM 一致
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[repr(i32)]
pub enum GroupRole {
    #[default]
    Member = 0,
    Manager = 1,
    Owner = 2,
    Other = 3,
}

impl GroupRole {
    /// 解析库表中的身份字段，无法识别的值视为 `Other`
    pub fn from_column(value: &str) -> Self {
        value.parse().unwrap_or(GroupRole::Other)
    }
}

/// 群成员（用户名 + 身份）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub username: String,
    pub role: GroupRole,
}

impl GroupMember {
    pub fn new(username: impl Into<String>, role: GroupRole) -> Self {
        Self { username: username.into(), role }
    }
}

#[cfg(test)]
mod tests {
    use super::GroupRole;

    #[test]
    fn test_role_column_mapping() {
        assert_eq!(GroupRole::Owner.as_ref(), "owner");
        assert_eq!(GroupRole::from_column("manager"), GroupRole::Manager);
        assert_eq!(GroupRole::from_column("admin"), GroupRole::Other);
        assert_eq!(i32::from(GroupRole::Other), 3);
        assert_eq!(GroupRole::try_from(2).unwrap(), GroupRole::Owner);
    }
}
