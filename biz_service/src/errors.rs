use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt::Display;
use thiserror::Error;

/// 响应结果码（随响应体下发，不走 gRPC status）
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive, strum_macros::Display)]
#[repr(i32)]
pub enum ResultCode {
    Success = 800,
    QueryError = 1801,
    DatabaseError = 1802,
    NotFound = 1803,
    PermissionDenied = 1804,
    PasswordIncorrect = 1805,
    AlreadyInGroup = 1806,
}

/// 群成员业务错误
#[derive(Debug, Error)]
pub enum GroupUserError {
    /// 用户服务查询失败
    #[error("User query error: {0}")]
    QueryError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// 资源不存在，携带资源名（Group / User）
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Permission denied")]
    PermissionDenied,
    #[error("Password incorrect")]
    PasswordIncorrect,
    #[error("User already in group")]
    AlreadyInGroup,
}

impl GroupUserError {
    pub fn query(err: impl Display) -> Self {
        GroupUserError::QueryError(err.to_string())
    }

    pub fn database(err: impl Display) -> Self {
        GroupUserError::DatabaseError(err.to_string())
    }

    pub fn group_not_found() -> Self {
        GroupUserError::NotFound("Group")
    }

    pub fn user_not_found() -> Self {
        GroupUserError::NotFound("User")
    }

    pub fn code(&self) -> ResultCode {
        match self {
            GroupUserError::QueryError(_) => ResultCode::QueryError,
            GroupUserError::DatabaseError(_) => ResultCode::DatabaseError,
            GroupUserError::NotFound(_) => ResultCode::NotFound,
            GroupUserError::PermissionDenied => ResultCode::PermissionDenied,
            GroupUserError::PasswordIncorrect => ResultCode::PasswordIncorrect,
            GroupUserError::AlreadyInGroup => ResultCode::AlreadyInGroup,
        }
    }
}
