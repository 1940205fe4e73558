//! gRPC 消息体定义。
//!
//! 字段编号与线上 proto 保持一致；服务桩由 build.rs 生成后在下方引入。

/// 通用结果
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResultInfo {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub msg: ::prost::alloc::string::String,
}

/// 群成员身份（线上枚举值）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MemberType {
    Member = 0,
    Manager = 1,
    Owner = 2,
    Other = 3,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MemberObject {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(enumeration = "MemberType", tag = "2")]
    pub r#type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PingRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Pong {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetGroupsByUidRequest {
    #[prost(int32, tag = "1")]
    pub uid: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetGroupsByUidResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultInfo>,
    #[prost(int32, repeated, tag = "2")]
    pub groups: ::prost::alloc::vec::Vec<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetGroupPublicInfoRequest {
    #[prost(int32, tag = "1")]
    pub group_id: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetGroupPublicInfoResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultInfo>,
    #[prost(int32, tag = "2")]
    pub id: i32,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    /// 创建时间（Unix 秒）
    #[prost(int64, tag = "4")]
    pub created_at: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetGroupInfoRequest {
    #[prost(int32, tag = "1")]
    pub group_id: i32,
    #[prost(int32, tag = "2")]
    pub uid: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetGroupInfoResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultInfo>,
    #[prost(message, repeated, tag = "2")]
    pub members: ::prost::alloc::vec::Vec<MemberObject>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct JoinGroupRequest {
    #[prost(int32, tag = "1")]
    pub group_id: i32,
    #[prost(int32, tag = "2")]
    pub uid: i32,
    #[prost(string, tag = "3")]
    pub password: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct JoinGroupResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultInfo>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InviteGroupRequest {
    #[prost(int32, tag = "1")]
    pub group_id: i32,
    #[prost(int32, tag = "2")]
    pub uid: i32,
    #[prost(string, tag = "3")]
    pub username: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InviteGroupResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultInfo>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateGroupRequest {
    #[prost(int32, tag = "1")]
    pub uid: i32,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateGroupResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultInfo>,
    #[prost(int32, tag = "2")]
    pub group_id: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetUserTypeRequest {
    #[prost(int32, tag = "1")]
    pub group_id: i32,
    #[prost(int32, tag = "2")]
    pub uid: i32,
    #[prost(string, tag = "3")]
    pub username: ::prost::alloc::string::String,
    #[prost(enumeration = "MemberType", tag = "4")]
    pub r#type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetUserTypeResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultInfo>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChangeGroupNameRequest {
    #[prost(int32, tag = "1")]
    pub group_id: i32,
    #[prost(int32, tag = "2")]
    pub uid: i32,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChangeGroupNameResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultInfo>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChangeGroupPasswordRequest {
    #[prost(int32, tag = "1")]
    pub group_id: i32,
    #[prost(int32, tag = "2")]
    pub uid: i32,
    #[prost(string, tag = "3")]
    pub password: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChangeGroupPasswordResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultInfo>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KickUserRequest {
    #[prost(int32, tag = "1")]
    pub group_id: i32,
    #[prost(int32, tag = "2")]
    pub uid: i32,
    #[prost(string, tag = "3")]
    pub username: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KickUserResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultInfo>,
}

// ---------- 用户服务 ----------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetUidByUsernameRequest {
    #[prost(string, tag = "1")]
    pub username: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetUidByUsernameResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultInfo>,
    #[prost(int32, tag = "2")]
    pub user_id: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetUsernameByUidRequest {
    #[prost(int32, tag = "1")]
    pub user_id: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetUsernameByUidResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<ResultInfo>,
    #[prost(string, tag = "2")]
    pub username: ::prost::alloc::string::String,
}

pub mod group_user {
    include!(concat!(env!("OUT_DIR"), "/stealthim.groupuser.StealthIMGroupUser.rs"));
}

pub mod user {
    include!(concat!(env!("OUT_DIR"), "/stealthim.user.StealthIMUser.rs"));
}
