use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 创建缓存实例
async fn create_cache() -> Result<Arc<dyn ObjectCache>, Box<dyn std::error::Error>> {
    let config = AppConfig::get();
    let cache_type = &config.cache.cache_type;

    warn!("Attempting to create {} cache backend", cache_type);

    // 根据配置选择缓存后端
    if let Some(constructor) = get_object_cache_plugin(cache_type) {
        match constructor().await {
            Ok(cache) => {
                warn!("Successfully created {} cache backend", cache_type);
                return Ok(Arc::from(cache));
            }
            Err(e) => {
                warn!("Failed to create {} cache: {}", cache_type, e);

                // 如果配置的缓存失败，尝试回退策略
                if cache_type == "redis" {
                    warn!("Falling back to memory cache");
                    if let Some(fallback_constructor) = get_object_cache_plugin("moka") {
                        match fallback_constructor().await {
                            Ok(cache) => {
                                warn!(
                                    "Successfully created fallback Moka (in-memory) cache backend"
                                );
                                return Ok(Arc::from(cache));
                            }
                            Err(fallback_e) => {
                                warn!("Failed to create fallback Moka cache: {}", fallback_e);
                            }
                        }
                    }
                }
            }
        }
    } else {
        warn!("Cache backend '{}' not found in registry", cache_type);

        // 如果找不到配置的缓存类型，尝试默认的内存缓存
        if cache_type != "moka" {
            warn!("Falling back to default memory cache");
            if let Some(fallback_constructor) = get_object_cache_plugin("moka") {
                match fallback_constructor().await {
                    Ok(cache) => {
                        warn!("Successfully created fallback Moka (in-memory) cache backend");
                        return Ok(Arc::from(cache));
                    }
                    Err(fallback_e) => {
                        warn!("Failed to create fallback Moka cache: {}", fallback_e);
                    }
                }
            }
        }
    }

    Err(format!("No cache backend available (tried: {cache_type})").into())
}

/// 写入初始管理员
/// 配置了 `auth.bootstrap_admin_subject` 且该身份尚未登记时，登记为管理员
async fn seed_admin(storage: &Arc<dyn Storage>) {
    let auth = &AppConfig::get().auth;
    let subject = auth.bootstrap_admin_subject.trim();
    if subject.is_empty() {
        debug!("No bootstrap admin subject configured, skipping admin seed");
        return;
    }

    match storage.get_user_by_external_id(subject).await {
        Ok(Some(user)) => {
            debug!(
                "Bootstrap admin already registered (ID: {}, role: {})",
                user.id, user.role
            );
            return;
        }
        Ok(None) => {
            info!("Registering bootstrap admin account for subject {}", subject);
        }
        Err(e) => {
            warn!("Failed to look up bootstrap admin: {}, skipping admin seed", e);
            return;
        }
    }

    let email = if auth.bootstrap_admin_email.trim().is_empty() {
        format!("{subject}@localhost")
    } else {
        auth.bootstrap_admin_email.trim().to_string()
    };

    let admin_request = CreateUserRequest {
        external_id: subject.to_string(),
        email,
        display_name: Some("Administrator".to_string()),
        role: UserRole::Admin,
    };

    match storage.create_user(admin_request).await {
        Ok(user) => {
            info!(
                "Bootstrap admin account created successfully (ID: {}, email: {})",
                user.id, user.email
            );
        }
        Err(e) => {
            warn!("Failed to create bootstrap admin account: {}", e);
        }
    }
}

/// 准备服务器启动的上下文
/// 包括 TLS 提供方、存储（含迁移）、初始管理员和缓存
pub async fn prepare_server_startup() -> Result<StartupContext, Box<dyn std::error::Error>> {
    // 重复安装时返回 Err，说明已有默认提供方
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage()
        .await
        .map_err(|e| format!("Failed to create storage backend: {e}"))?;
    warn!("Storage backend initialized and migrations completed");

    // 初始化管理员账号（如果需要）
    seed_admin(&storage).await;

    // 创建缓存实例
    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    Ok(StartupContext { storage, cache })
}
