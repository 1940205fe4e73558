/// 当前 Unix 时间戳（秒）
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
