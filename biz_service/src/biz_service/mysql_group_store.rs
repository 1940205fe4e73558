use crate::biz_service::group_store::GroupStore;
use crate::entitys::group_entity::{GroupPublicInfo, GroupRecord};
use crate::entitys::group_member::{GroupMember, GroupRole};
use async_trait::async_trait;
use common::config::DatabaseConfig;
use common::errors::AppError;
use common::GroupId;
use log::info;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

/// MySQL 实现（库 `groups`，表 `groups` / `group_user_table`）
#[derive(Debug, Clone)]
pub struct MySqlGroupStore {
    pool: MySqlPool,
}

#[derive(sqlx::FromRow)]
struct PublicInfoRow {
    groupid: i32,
    name: String,
    create_time: i64,
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    username: String,
    role: String,
}

impl MySqlGroupStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = MySqlPoolOptions::new().max_connections(cfg.max_connections).connect(&cfg.url).await?;
        Ok(Self::new(pool))
    }

    /// 执行内嵌迁移
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl GroupStore for MySqlGroupStore {
    async fn list_groups_of_user(&self, username: &str) -> Result<Vec<GroupId>, AppError> {
        let groups = sqlx::query_scalar::<_, i32>("SELECT groupid FROM group_user_table WHERE username = ? ORDER BY groupid")
            .bind(username)
            .fetch_all(&self.pool)
            .await?;
        Ok(groups)
    }

    async fn find_public_info(&self, group_id: GroupId) -> Result<Option<GroupPublicInfo>, AppError> {
        let row = sqlx::query_as::<_, PublicInfoRow>("SELECT groupid, name, create_time FROM `groups` WHERE groupid = ?")
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| GroupPublicInfo { id: r.groupid, name: r.name, created_at: r.create_time }))
    }

    async fn list_members(&self, group_id: GroupId) -> Result<Vec<GroupMember>, AppError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            "SELECT username, CAST(type AS CHAR) AS role FROM group_user_table WHERE groupid = ? ORDER BY id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| GroupMember::new(r.username, GroupRole::from_column(&r.role))).collect())
    }

    async fn find_password_hash(&self, group_id: GroupId) -> Result<Option<String>, AppError> {
        let hash = sqlx::query_scalar::<_, String>("SELECT password FROM `groups` WHERE groupid = ?")
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(hash)
    }

    async fn insert_group(&self, group: &GroupRecord) -> Result<GroupId, AppError> {
        let result = sqlx::query("INSERT INTO `groups` (name, create_time, password, owner_uid) VALUES (?, ?, ?, ?)")
            .bind(&group.name)
            .bind(group.create_time)
            .bind(&group.password)
            .bind(group.owner_uid)
            .execute(&self.pool)
            .await?;
        GroupId::try_from(result.last_insert_id())
            .map_err(|_| AppError::ConversionError(format!("group id out of range: {}", result.last_insert_id())))
    }

    async fn insert_member(&self, group_id: GroupId, username: &str, role: GroupRole) -> Result<bool, AppError> {
        let result = sqlx::query("INSERT INTO group_user_table (groupid, username, type) VALUES (?, ?, ?)")
            .bind(group_id)
            .bind(username)
            .bind(role.as_ref())
            .execute(&self.pool)
            .await;
        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_group(&self, group_id: GroupId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM `groups` WHERE groupid = ?").bind(group_id).execute(&self.pool).await?;
        Ok(())
    }

    async fn update_member_role(&self, group_id: GroupId, username: &str, role: GroupRole) -> Result<(), AppError> {
        sqlx::query("UPDATE group_user_table SET type = ? WHERE groupid = ? AND username = ?")
            .bind(role.as_ref())
            .bind(group_id)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_member(&self, group_id: GroupId, username: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM group_user_table WHERE groupid = ? AND username = ?")
            .bind(group_id)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_group_name(&self, group_id: GroupId, name: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE `groups` SET name = ? WHERE groupid = ?").bind(name).bind(group_id).execute(&self.pool).await?;
        Ok(())
    }

    async fn update_group_password(&self, group_id: GroupId, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE `groups` SET password = ? WHERE groupid = ?")
            .bind(password_hash)
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// (groupid, username) 唯一键冲突（MySQL 1062）
fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_error) if db_error.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::is_unique_violation;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::error::Error;
    use std::fmt;

    #[derive(Debug)]
    struct FakeDbError {
        duplicate: bool,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake database error")
        }
    }

    impl Error for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "fake database error"
        }

        fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.duplicate { ErrorKind::UniqueViolation } else { ErrorKind::Other }
        }
    }

    #[test]
    fn test_only_duplicate_key_counts_as_already_present() {
        assert!(is_unique_violation(&sqlx::Error::Database(Box::new(FakeDbError { duplicate: true }))));
        // 截断等其他数据库错误必须原样上抛
        assert!(!is_unique_violation(&sqlx::Error::Database(Box::new(FakeDbError { duplicate: false }))));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
