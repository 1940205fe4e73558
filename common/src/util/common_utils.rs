use hex::encode;
use sha2::{Digest, Sha256};

/// 群密码摘要：sha256(password + salt) 的十六进制串。
/// 空密码同样走摘要，"无密码" 即空串的摘要。
pub fn build_password_hash(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::build_password_hash;

    #[test]
    fn test_empty_password_digest() {
        // sha256("")
        assert_eq!(
            build_password_hash("", ""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_salt_is_appended() {
        assert_eq!(build_password_hash("abc", "salt"), build_password_hash("abcsalt", ""));
        assert_ne!(build_password_hash("abc", "salt"), build_password_hash("abc", "pepper"));
    }
}
