use crate::errors::ResultCode;
use crate::protocol::user::stealth_i_m_user_client::StealthIMUserClient;
use crate::protocol::{GetUidByUsernameRequest, GetUsernameByUidRequest, ResultInfo};
use async_trait::async_trait;
use common::errors::AppError;
use common::UserId;
use tonic::transport::Channel;

/// 用户目录：uid 与用户名互查
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn username_by_uid(&self, uid: UserId) -> Result<String, AppError>;

    async fn uid_by_username(&self, username: &str) -> Result<UserId, AppError>;

    /// 用户名是否存在；仅 RPC 本身失败时返回错误
    async fn has_username(&self, username: &str) -> Result<bool, AppError>;
}

/// 用户服务 gRPC 客户端（惰性连接）
#[derive(Debug, Clone)]
pub struct UserDirectoryClient {
    client: StealthIMUserClient<Channel>,
}

impl UserDirectoryClient {
    pub fn connect_lazy(addr: &str) -> Result<Self, AppError> {
        let channel = Channel::from_shared(addr.to_string())
            .map_err(|e| AppError::Internal(format!("invalid user service address {}: {}", addr, e)))?
            .connect_lazy();
        Ok(Self { client: StealthIMUserClient::new(channel) })
    }
}

fn check_result(result: Option<ResultInfo>) -> Result<(), AppError> {
    match result {
        Some(r) if r.code == i32::from(ResultCode::Success) => Ok(()),
        Some(r) => Err(AppError::Internal(format!("user service returned {}: {}", r.code, r.msg))),
        None => Err(AppError::Internal("user service returned empty result".to_string())),
    }
}

#[async_trait]
impl UserDirectory for UserDirectoryClient {
    async fn username_by_uid(&self, uid: UserId) -> Result<String, AppError> {
        let mut client = self.client.clone();
        let resp = client.get_username_by_uid(GetUsernameByUidRequest { user_id: uid }).await?.into_inner();
        check_result(resp.result)?;
        Ok(resp.username)
    }

    async fn uid_by_username(&self, username: &str) -> Result<UserId, AppError> {
        let mut client = self.client.clone();
        let resp = client
            .get_uid_by_username(GetUidByUsernameRequest { username: username.to_string() })
            .await?
            .into_inner();
        check_result(resp.result)?;
        Ok(resp.user_id)
    }

    async fn has_username(&self, username: &str) -> Result<bool, AppError> {
        let mut client = self.client.clone();
        let resp = client
            .get_uid_by_username(GetUidByUsernameRequest { username: username.to_string() })
            .await?
            .into_inner();
        Ok(check_result(resp.result).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result() {
        assert!(check_result(Some(ResultInfo { code: 800, msg: String::new() })).is_ok());
        assert!(check_result(Some(ResultInfo { code: 1803, msg: "not found".to_string() })).is_err());
        assert!(check_result(None).is_err());
    }

    #[tokio::test]
    async fn test_connect_lazy_rejects_bad_address() {
        assert!(UserDirectoryClient::connect_lazy("http://127.0.0.1:50055").is_ok());
        assert!(UserDirectoryClient::connect_lazy("not a uri\n").is_err());
    }
}
