use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeartbeatError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),
    #[error("心跳记录未找到: {mac_address}")]
    HeartbeatNotFound { mac_address: String },
    #[error("无效的时间格式: {value}")]
    InvalidBeatTime { value: String },
    #[error("没有需要更新的字段")]
    EmptyUpdate,
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type HeartbeatResult<T> = Result<T, HeartbeatError>;

impl HeartbeatError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }

    pub fn heartbeat_not_found<S: Into<String>>(mac_address: S) -> Self {
        Self::HeartbeatNotFound {
            mac_address: mac_address.into(),
        }
    }

    pub fn invalid_beat_time<S: Into<String>>(value: S) -> Self {
        Self::InvalidBeatTime {
            value: value.into(),
        }
    }

    /// 判断是否为连接类错误，监控循环据此延长重试间隔
    pub fn is_connectivity(&self) -> bool {
        match self {
            HeartbeatError::Database(e) => {
                matches!(
                    e,
                    sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
                ) || e.to_string().to_lowercase().contains("connection")
            }
            other => other.to_string().to_lowercase().contains("connection"),
        }
    }

    /// 客户端可见的请求错误（404/400），区别于服务端故障
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            HeartbeatError::HeartbeatNotFound { .. }
                | HeartbeatError::InvalidBeatTime { .. }
                | HeartbeatError::EmptyUpdate
        )
    }
}

impl From<anyhow::Error> for HeartbeatError {
    fn from(err: anyhow::Error) -> Self {
        HeartbeatError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_detection() {
        let err = HeartbeatError::DatabaseOperation("connection refused".to_string());
        assert!(err.is_connectivity());

        let err = HeartbeatError::Database(sqlx::Error::PoolTimedOut);
        assert!(err.is_connectivity());

        let err = HeartbeatError::EmptyUpdate;
        assert!(!err.is_connectivity());

        let err = HeartbeatError::heartbeat_not_found("AA:BB:CC:DD:EE:FF");
        assert!(!err.is_connectivity());
    }

    #[test]
    fn test_client_error_classification() {
        assert!(HeartbeatError::EmptyUpdate.is_client_error());
        assert!(HeartbeatError::heartbeat_not_found("AA:BB").is_client_error());
        assert!(HeartbeatError::invalid_beat_time("not-a-time").is_client_error());
        assert!(!HeartbeatError::Internal("boom".to_string()).is_client_error());
    }
}
