//! 缓存快照：缓存中保存的读模型，与 gRPC 消息体相互独立。
//!
//! 编码格式为 1 字节版本号 + prost 编码正文；版本不符、正文损坏或身份值未知
//! 都按缓存未命中处理。

use crate::entitys::group_entity::GroupPublicInfo;
use crate::entitys::group_member::{GroupMember, GroupRole};
use common::GroupId;
use prost::Message;

pub const SNAPSHOT_VERSION: u8 = 1;

/// 可写入缓存的值
pub trait CacheValue: Sized + Send + 'static {
    fn encode(&self) -> Vec<u8>;

    /// 解码失败返回 `None`，调用方回源
    fn decode(bytes: &[u8]) -> Option<Self>;

    /// 是否需要回写缓存
    fn is_cacheable(&self) -> bool {
        true
    }
}

/// `None` 表示存储中不存在，不写入缓存
impl<T: CacheValue> CacheValue for Option<T> {
    fn encode(&self) -> Vec<u8> {
        match self {
            Some(value) => value.encode(),
            None => Vec::new(),
        }
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        T::decode(bytes).map(Some)
    }

    fn is_cacheable(&self) -> bool {
        self.as_ref().is_some_and(|value| value.is_cacheable())
    }
}

/// 纯字符串（群密码摘要），空串不缓存
impl CacheValue for String {
    fn encode(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        String::from_utf8(bytes.to_vec()).ok().filter(|s| !s.is_empty())
    }

    fn is_cacheable(&self) -> bool {
        !self.is_empty()
    }
}

fn encode_versioned<M: Message>(message: &M) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + message.encoded_len());
    buf.push(SNAPSHOT_VERSION);
    buf.extend_from_slice(&message.encode_to_vec());
    buf
}

fn decode_versioned<M: Message + Default>(bytes: &[u8]) -> Option<M> {
    let (&version, body) = bytes.split_first()?;
    if version != SNAPSHOT_VERSION {
        return None;
    }
    M::decode(body).ok()
}

#[derive(Clone, PartialEq, Message)]
struct MemberEntry {
    #[prost(string, tag = "1")]
    username: String,
    #[prost(int32, tag = "2")]
    role: i32,
}

#[derive(Clone, PartialEq, Message)]
struct MembershipMessage {
    #[prost(message, repeated, tag = "1")]
    members: Vec<MemberEntry>,
}

#[derive(Clone, PartialEq, Message)]
struct GroupListMessage {
    #[prost(int32, repeated, tag = "1")]
    groups: Vec<i32>,
}

#[derive(Clone, PartialEq, Message)]
struct PublicInfoMessage {
    #[prost(int32, tag = "1")]
    id: i32,
    #[prost(string, tag = "2")]
    name: String,
    #[prost(int64, tag = "3")]
    created_at: i64,
}

/// 群成员快照（有序）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MembershipSnapshot {
    pub members: Vec<GroupMember>,
}

impl MembershipSnapshot {
    pub fn new(members: Vec<GroupMember>) -> Self {
        Self { members }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn find(&self, username: &str) -> Option<&GroupMember> {
        self.members.iter().find(|m| m.username == username)
    }
}

impl CacheValue for MembershipSnapshot {
    fn encode(&self) -> Vec<u8> {
        let message = MembershipMessage {
            members: self
                .members
                .iter()
                .map(|m| MemberEntry { username: m.username.clone(), role: m.role.into() })
                .collect(),
        };
        encode_versioned(&message)
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        let message: MembershipMessage = decode_versioned(bytes)?;
        let members = message
            .members
            .into_iter()
            .map(|entry| GroupRole::try_from(entry.role).ok().map(|role| GroupMember::new(entry.username, role)))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { members })
    }

    fn is_cacheable(&self) -> bool {
        !self.is_empty()
    }
}

/// 用户所在群列表快照；空列表同样缓存
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupsByUserSnapshot {
    pub groups: Vec<GroupId>,
}

impl CacheValue for GroupsByUserSnapshot {
    fn encode(&self) -> Vec<u8> {
        encode_versioned(&GroupListMessage { groups: self.groups.clone() })
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        let message: GroupListMessage = decode_versioned(bytes)?;
        Some(Self { groups: message.groups })
    }
}

impl CacheValue for GroupPublicInfo {
    fn encode(&self) -> Vec<u8> {
        encode_versioned(&PublicInfoMessage { id: self.id, name: self.name.clone(), created_at: self.created_at })
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        let message: PublicInfoMessage = decode_versioned(bytes)?;
        Some(Self { id: message.id, name: message.name, created_at: message.created_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MembershipSnapshot {
        MembershipSnapshot::new(vec![
            GroupMember::new("alice", GroupRole::Owner),
            GroupMember::new("bob", GroupRole::Member),
            GroupMember::new("carol", GroupRole::Manager),
            GroupMember::new("dave", GroupRole::Other),
        ])
    }

    #[test]
    fn test_membership_keeps_order() {
        let snapshot = sample();
        let bytes = snapshot.encode();
        assert_eq!(bytes[0], SNAPSHOT_VERSION);
        assert_eq!(MembershipSnapshot::decode(&bytes), Some(snapshot));
    }

    #[test]
    fn test_rejects_wrong_version_and_garbage() {
        let mut bytes = sample().encode();
        bytes[0] = SNAPSHOT_VERSION + 1;
        assert!(MembershipSnapshot::decode(&bytes).is_none());
        assert!(MembershipSnapshot::decode(&[]).is_none());
        assert!(MembershipSnapshot::decode(&[SNAPSHOT_VERSION, 0xff, 0xff, 0xff]).is_none());
        // 旧格式（无版本号的纯文本）
        assert!(GroupPublicInfo::decode(b"42|team|1700000000").is_none());
    }

    #[test]
    fn test_rejects_unknown_role() {
        let message = MembershipMessage { members: vec![MemberEntry { username: "eve".to_string(), role: 9 }] };
        let bytes = encode_versioned(&message);
        assert!(MembershipSnapshot::decode(&bytes).is_none());
    }

    #[test]
    fn test_cacheable_rules() {
        assert!(!MembershipSnapshot::default().is_cacheable());
        assert!(sample().is_cacheable());
        assert!(GroupsByUserSnapshot::default().is_cacheable());
        assert!(!Option::<GroupPublicInfo>::None.is_cacheable());
        assert!(!Some(String::new()).is_cacheable());
        assert!(Some("abc".to_string()).is_cacheable());
    }

    #[test]
    fn test_public_info_and_password() {
        let info = GroupPublicInfo { id: 42, name: "Team".to_string(), created_at: 1_700_000_000 };
        let decoded = Option::<GroupPublicInfo>::decode(&Some(info.clone()).encode());
        assert_eq!(decoded, Some(Some(info)));

        assert_eq!(Option::<String>::decode(b"deadbeef"), Some(Some("deadbeef".to_string())));
        assert_eq!(Option::<String>::decode(&[0xff, 0xfe]), None);
        assert_eq!(Option::<String>::decode(b""), None);
    }
}
