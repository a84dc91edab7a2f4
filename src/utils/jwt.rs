//! 身份令牌校验
//!
//! 令牌由外部身份提供方签发（HS256，共享密钥），`sub` 为提供方的用户 ID。

use crate::config::AppConfig;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 身份提供方 subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize, // 过期时间戳
    pub iat: usize, // 签发时间戳
}

pub struct JwtUtils;

impl JwtUtils {
    /// 使用全局配置校验令牌
    pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        Self::verify_token_with_secret(token, &config.auth.jwt_secret, config.auth.leeway_secs)
    }

    /// 使用指定密钥校验令牌
    pub fn verify_token_with_secret(
        token: &str,
        secret: &str,
        leeway_secs: u64,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let mut validation = Validation::default();
        validation.leeway = leeway_secs;

        let claims =
            decode::<Claims>(token, &decoding_key, &validation).map(|data| data.claims)?;
        if claims.sub.trim().is_empty() {
            return Err(jsonwebtoken::errors::ErrorKind::InvalidSubject.into());
        }
        Ok(claims)
    }

    /// 签发令牌（本地开发与测试时模拟身份提供方）
    pub fn issue_token_with_secret(
        subject: &str,
        email: Option<&str>,
        secret: &str,
        expiry: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            email: email.map(str::to_string),
            exp: (now + expiry).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_issue_and_verify() {
        let token = JwtUtils::issue_token_with_secret(
            "user_2abc",
            Some("teacher@school.test"),
            SECRET,
            chrono::Duration::minutes(5),
        )
        .unwrap();

        let claims = JwtUtils::verify_token_with_secret(&token, SECRET, 0).unwrap();
        assert_eq!(claims.sub, "user_2abc");
        assert_eq!(claims.email.as_deref(), Some("teacher@school.test"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtUtils::issue_token_with_secret(
            "user_2abc",
            None,
            SECRET,
            chrono::Duration::minutes(5),
        )
        .unwrap();

        assert!(JwtUtils::verify_token_with_secret(&token, "other-secret", 0).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = JwtUtils::issue_token_with_secret(
            "user_2abc",
            None,
            SECRET,
            chrono::Duration::minutes(-10),
        )
        .unwrap();

        assert!(JwtUtils::verify_token_with_secret(&token, SECRET, 0).is_err());
    }

    #[test]
    fn test_empty_subject_rejected() {
        let token =
            JwtUtils::issue_token_with_secret("", None, SECRET, chrono::Duration::minutes(5))
                .unwrap();

        assert!(JwtUtils::verify_token_with_secret(&token, SECRET, 0).is_err());
    }
}
