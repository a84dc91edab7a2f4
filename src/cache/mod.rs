//! 对象缓存层
//!
//! 通过插件注册表选择后端（`moka` 内存缓存或 `redis`），
//! 后端在加载时由 `declare_object_cache_plugin!` 自动注册。

pub mod object_cache;
pub mod register;
pub mod traits;

pub use traits::{CacheResult, ObjectCache};
