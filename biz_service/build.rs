//! 生成 gRPC 服务桩代码。
//!
//! 消息体直接以 `prost::Message` 派生写在 `src/protocol`，这里只按服务描述生成
//! client/server 代码，因此构建时不依赖 protoc。

const PROST_CODEC: &str = "tonic::codec::ProstCodec";

fn method(name: &str, route: &str, input: &str, output: &str) -> tonic_build::manual::Method {
    tonic_build::manual::Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::protocol::{}", input))
        .output_type(format!("crate::protocol::{}", output))
        .codec_path(PROST_CODEC)
        .build()
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // 群成员服务：对外提供 server，同时生成 client 便于联调
    let group_user = tonic_build::manual::Service::builder()
        .name("StealthIMGroupUser")
        .package("stealthim.groupuser")
        .method(method("ping", "Ping", "PingRequest", "Pong"))
        .method(method("get_groups_by_uid", "GetGroupsByUID", "GetGroupsByUidRequest", "GetGroupsByUidResponse"))
        .method(method("get_group_public_info", "GetGroupPublicInfo", "GetGroupPublicInfoRequest", "GetGroupPublicInfoResponse"))
        .method(method("get_group_info", "GetGroupInfo", "GetGroupInfoRequest", "GetGroupInfoResponse"))
        .method(method("join_group", "JoinGroup", "JoinGroupRequest", "JoinGroupResponse"))
        .method(method("invite_group", "InviteGroup", "InviteGroupRequest", "InviteGroupResponse"))
        .method(method("create_group", "CreateGroup", "CreateGroupRequest", "CreateGroupResponse"))
        .method(method("set_user_type", "SetUserType", "SetUserTypeRequest", "SetUserTypeResponse"))
        .method(method("change_group_name", "ChangeGroupName", "ChangeGroupNameRequest", "ChangeGroupNameResponse"))
        .method(method("change_group_password", "ChangeGroupPassword", "ChangeGroupPasswordRequest", "ChangeGroupPasswordResponse"))
        .method(method("kick_user", "KickUser", "KickUserRequest", "KickUserResponse"))
        .build();
    tonic_build::manual::Builder::new().compile(&[group_user]);

    // 用户服务：只需要 client
    let user_directory = tonic_build::manual::Service::builder()
        .name("StealthIMUser")
        .package("stealthim.user")
        .method(method("get_uid_by_username", "GetUIDByUsername", "GetUidByUsernameRequest", "GetUidByUsernameResponse"))
        .method(method("get_username_by_uid", "GetUsernameByUID", "GetUsernameByUidRequest", "GetUsernameByUidResponse"))
        .build();
    tonic_build::manual::Builder::new().build_server(false).compile(&[user_directory]);
}
