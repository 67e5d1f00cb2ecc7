use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use bcrypt::{hash, verify, DEFAULT_COST};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use whisper_api::{Error, Result};

/// 密码哈希算法类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordAlgorithm {
    /// 十六进制SHA-256摘要
    #[default]
    Sha256,
    Bcrypt,
    Argon2,
}

/// 默认密码服务实现
#[derive(Debug, Clone)]
pub struct DefaultPasswordService {
    algorithm: PasswordAlgorithm,
    bcrypt_cost: u32,
}

impl DefaultPasswordService {
    pub fn new(algorithm: PasswordAlgorithm) -> Self {
        Self {
            algorithm,
            bcrypt_cost: DEFAULT_COST,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn algorithm(&self) -> PasswordAlgorithm {
        self.algorithm
    }

    /// 计算密码哈希
    pub fn hash(&self, password: &str) -> Result<String> {
        match self.algorithm {
            PasswordAlgorithm::Sha256 => Ok(hex::encode(Sha256::digest(password.as_bytes()))),
            PasswordAlgorithm::Bcrypt => hash(password, self.bcrypt_cost)
                .map_err(|e| Error::Config(format!("Bcrypt hash error: {}", e))),
            PasswordAlgorithm::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let password_hash = Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| Error::Config(format!("Argon2 hash error: {}", e)))?;
                Ok(password_hash.to_string())
            }
        }
    }

    /// 校验密码，哈希格式错误视为配置错误
    pub fn verify(&self, password: &str, hashed: &str) -> Result<bool> {
        match self.algorithm {
            PasswordAlgorithm::Sha256 => {
                let digest = hex::encode(Sha256::digest(password.as_bytes()));
                Ok(digest.eq_ignore_ascii_case(hashed.trim()))
            }
            PasswordAlgorithm::Bcrypt => verify(password, hashed)
                .map_err(|e| Error::Config(format!("Bcrypt verify error: {}", e))),
            PasswordAlgorithm::Argon2 => {
                let parsed_hash = PasswordHash::new(hashed)
                    .map_err(|e| Error::Config(format!("Argon2 parse hash error: {}", e)))?;
                match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
                    Ok(()) => Ok(true),
                    Err(argon2::password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(Error::Config(format!("Argon2 verify error: {}", e))),
                }
            }
        }
    }
}
