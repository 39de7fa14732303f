// 进程级配置：环境变量与引擎配置

pub mod engine;
pub mod env;

pub use engine::{DomainConfig, EngineConfig, TopologyKind};
pub use env::{EnvConfig, ModelDefaults};
