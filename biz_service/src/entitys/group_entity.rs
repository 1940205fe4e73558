use common::GroupId;

/// 待写入的群记录，群 ID 由存储分配
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub name: String,
    /// 群密码摘要（sha256(password + salt) 的十六进制）
    pub password: String,
    pub owner_uid: common::UserId,
    /// 创建时间（Unix 秒时间戳）
    pub create_time: i64,
}

/// 群公开信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPublicInfo {
    pub id: GroupId,
    pub name: String,
    pub created_at: i64,
}
