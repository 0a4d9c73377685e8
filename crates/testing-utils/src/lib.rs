//! 心跳监控系统的共享测试工具
//!
//! 提供各仓储接口的内存实现和测试数据构造器，供工作区内其他
//! crate作为dev-dependency使用，无需真实数据库即可测试。

pub mod builders;
pub mod mocks;

pub use builders::*;
pub use mocks::*;
