use biz_service::biz_service::group_user_service::GroupUserService;
use biz_service::entitys::group_member::{GroupMember, GroupRole};
use biz_service::errors::{GroupUserError, ResultCode};
use biz_service::protocol::group_user::stealth_i_m_group_user_server::StealthIMGroupUser;
use biz_service::protocol::*;
use log::{debug, warn};
use tonic::{Request, Response, Status};

/// gRPC 入口：业务结果统一放入响应体的 `result`，不返回 Status 错误
pub struct GroupUserRpcServiceImpl {
    service: GroupUserService,
}

impl GroupUserRpcServiceImpl {
    pub fn new(service: GroupUserService) -> Self {
        Self { service }
    }
}

fn result_of<T>(op: &str, result: &Result<T, GroupUserError>) -> Option<ResultInfo> {
    let info = match result {
        Ok(_) => ResultInfo { code: ResultCode::Success.into(), msg: String::new() },
        Err(err) => {
            match err {
                GroupUserError::QueryError(_) | GroupUserError::DatabaseError(_) => warn!("{} failed: {}", op, err),
                _ => debug!("{} rejected: {}", op, err),
            }
            ResultInfo { code: err.code().into(), msg: err.to_string() }
        }
    };
    Some(info)
}

fn to_member_type(role: GroupRole) -> MemberType {
    match role {
        GroupRole::Owner => MemberType::Owner,
        GroupRole::Manager => MemberType::Manager,
        GroupRole::Member => MemberType::Member,
        GroupRole::Other => MemberType::Other,
    }
}

/// 未知枚举值按 other 处理
fn to_group_role(value: i32) -> GroupRole {
    match MemberType::try_from(value) {
        Ok(MemberType::Owner) => GroupRole::Owner,
        Ok(MemberType::Manager) => GroupRole::Manager,
        Ok(MemberType::Member) => GroupRole::Member,
        Ok(MemberType::Other) | Err(_) => GroupRole::Other,
    }
}

fn to_member_object(member: GroupMember) -> MemberObject {
    MemberObject { name: member.username, r#type: to_member_type(member.role).into() }
}

#[tonic::async_trait]
impl StealthIMGroupUser for GroupUserRpcServiceImpl {
    async fn ping(&self, _request: Request<PingRequest>) -> Result<Response<Pong>, Status> {
        Ok(Response::new(Pong {}))
    }

    async fn get_groups_by_uid(
        &self,
        request: Request<GetGroupsByUidRequest>,
    ) -> Result<Response<GetGroupsByUidResponse>, Status> {
        let req = request.into_inner();
        let result = self.service.get_groups_by_uid(req.uid).await;
        Ok(Response::new(GetGroupsByUidResponse {
            result: result_of("get_groups_by_uid", &result),
            groups: result.unwrap_or_default(),
        }))
    }

    async fn get_group_public_info(
        &self,
        request: Request<GetGroupPublicInfoRequest>,
    ) -> Result<Response<GetGroupPublicInfoResponse>, Status> {
        let req = request.into_inner();
        let result = self.service.get_group_public_info(req.group_id).await;
        let mut resp = GetGroupPublicInfoResponse { result: result_of("get_group_public_info", &result), ..Default::default() };
        if let Ok(info) = result {
            resp.id = info.id;
            resp.name = info.name;
            resp.created_at = info.created_at;
        }
        Ok(Response::new(resp))
    }

    async fn get_group_info(
        &self,
        request: Request<GetGroupInfoRequest>,
    ) -> Result<Response<GetGroupInfoResponse>, Status> {
        let req = request.into_inner();
        let result = self.service.get_group_info(req.group_id, req.uid).await;
        Ok(Response::new(GetGroupInfoResponse {
            result: result_of("get_group_info", &result),
            members: result.map(|members| members.into_iter().map(to_member_object).collect()).unwrap_or_default(),
        }))
    }

    async fn join_group(&self, request: Request<JoinGroupRequest>) -> Result<Response<JoinGroupResponse>, Status> {
        let req = request.into_inner();
        let result = self.service.join_group(req.group_id, req.uid, &req.password).await;
        Ok(Response::new(JoinGroupResponse { result: result_of("join_group", &result) }))
    }

    async fn invite_group(
        &self,
        request: Request<InviteGroupRequest>,
    ) -> Result<Response<InviteGroupResponse>, Status> {
        let req = request.into_inner();
        let result = self.service.invite_group(req.group_id, req.uid, &req.username).await;
        Ok(Response::new(InviteGroupResponse { result: result_of("invite_group", &result) }))
    }

    async fn create_group(
        &self,
        request: Request<CreateGroupRequest>,
    ) -> Result<Response<CreateGroupResponse>, Status> {
        let req = request.into_inner();
        let result = self.service.create_group(req.uid, &req.name).await;
        Ok(Response::new(CreateGroupResponse {
            result: result_of("create_group", &result),
            group_id: result.unwrap_or_default(),
        }))
    }

    async fn set_user_type(
        &self,
        request: Request<SetUserTypeRequest>,
    ) -> Result<Response<SetUserTypeResponse>, Status> {
        let req = request.into_inner();
        let role = to_group_role(req.r#type);
        let result = self.service.set_user_type(req.group_id, req.uid, &req.username, role).await;
        Ok(Response::new(SetUserTypeResponse { result: result_of("set_user_type", &result) }))
    }

    async fn change_group_name(
        &self,
        request: Request<ChangeGroupNameRequest>,
    ) -> Result<Response<ChangeGroupNameResponse>, Status> {
        let req = request.into_inner();
        let result = self.service.change_group_name(req.group_id, req.uid, &req.name).await;
        Ok(Response::new(ChangeGroupNameResponse { result: result_of("change_group_name", &result) }))
    }

    async fn change_group_password(
        &self,
        request: Request<ChangeGroupPasswordRequest>,
    ) -> Result<Response<ChangeGroupPasswordResponse>, Status> {
        let req = request.into_inner();
        let result = self.service.change_group_password(req.group_id, req.uid, &req.password).await;
        Ok(Response::new(ChangeGroupPasswordResponse { result: result_of("change_group_password", &result) }))
    }

    async fn kick_user(&self, request: Request<KickUserRequest>) -> Result<Response<KickUserResponse>, Status> {
        let req = request.into_inner();
        let result = self.service.kick_user(req.group_id, req.uid, &req.username).await;
        Ok(Response::new(KickUserResponse { result: result_of("kick_user", &result) }))
    }
}
