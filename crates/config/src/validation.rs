use crate::{ConfigError, ConfigResult};

/// 配置校验接口，各配置段实现后在AppConfig::validate中级联调用
pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

pub struct ValidationUtils;

impl ValidationUtils {
    pub fn validate_not_empty(value: &str, field: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{field} 不能为空")));
        }
        Ok(())
    }

    pub fn validate_count(value: usize, field: &str) -> ConfigResult<()> {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{field} 必须大于0")));
        }
        Ok(())
    }

    pub fn validate_timeout_seconds(value: u64, field: &str) -> ConfigResult<()> {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{field} 必须大于0")));
        }
        Ok(())
    }

    pub fn validate_bind_address(value: &str, field: &str) -> ConfigResult<()> {
        if value.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "{field} 不是有效的监听地址: {value}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty() {
        assert!(ValidationUtils::validate_not_empty("localhost", "database.host").is_ok());
        assert!(ValidationUtils::validate_not_empty("   ", "database.host").is_err());
    }

    #[test]
    fn test_bind_address() {
        assert!(ValidationUtils::validate_bind_address("0.0.0.0:8000", "api.bind_address").is_ok());
        assert!(ValidationUtils::validate_bind_address("not-an-addr", "api.bind_address").is_err());
    }
}
