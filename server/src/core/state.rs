use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{JwtService, TokenService};
use crate::cache::{CacheStorage, CartStore, TokenDenylist};
use crate::core::error::{Result, ServerError};
use crate::core::Config;
use crate::db::DbService;
use crate::sales::SalesManager;
use crate::storage::ImageStore;

/// Shared application state
///
/// Holds singleton references to every service. `Clone` is shallow
/// (Arc-backed) so handlers can take it by value.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Embedded database (SurrealDB)
    pub db: Surreal<Db>,
    /// Volatile cache (redb): carts + token denylist
    pub cache: CacheStorage,
    /// JWT signing/validation service
    pub jwt_service: Arc<JwtService>,
    /// Refresh token lifecycle (issue, rotate, revoke)
    pub token_service: Arc<TokenService>,
    /// Product image files on disk
    pub images: ImageStore,
}

impl ServerState {
    /// Initialize all services
    ///
    /// 1. Work directory structure
    /// 2. SurrealDB (work_dir/database/farmacia.db) + schema
    /// 3. redb cache (work_dir/cache/volatile.redb)
    /// 4. JWT + token services
    /// 5. Image store (work_dir/imagenes)
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_dir().join("farmacia.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;
        let db = db_service.db;

        let cache_path = config.cache_dir().join("volatile.redb");
        let cache = CacheStorage::open(&cache_path)?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let token_service = Arc::new(TokenService::new(
            jwt_service.clone(),
            cache.token_denylist(),
        ));

        let images = ImageStore::open(config.images_dir())?;

        Ok(Self {
            config: config.clone(),
            db,
            cache,
            jwt_service,
            token_service,
            images,
        })
    }

    /// State backed by in-memory stores, for tests
    #[cfg(test)]
    pub async fn for_tests(cache_path: &std::path::Path, images_dir: &std::path::Path) -> Self {
        use surrealdb::engine::local::Mem;

        let db = Surreal::new::<Mem>(()).await.expect("in-memory db");
        db.use_ns("farmacia").use_db("farmacia").await.expect("ns");
        crate::db::schema::initialize(&db).await.expect("schema");

        let cache = CacheStorage::open(cache_path).expect("cache");
        let config = Config::with_overrides("/tmp/farmacia-test", 0);
        let jwt_service = Arc::new(JwtService::with_config(crate::auth::JwtConfig::for_tests()));
        let token_service = Arc::new(TokenService::new(
            jwt_service.clone(),
            cache.token_denylist(),
        ));
        let images = ImageStore::open(images_dir).expect("image store");

        Self {
            config,
            db,
            cache,
            jwt_service,
            token_service,
            images,
        }
    }

    /// Database handle
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// JWT service handle
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Token lifecycle service handle
    pub fn get_token_service(&self) -> Arc<TokenService> {
        self.token_service.clone()
    }

    /// Cart store, bound to the configured TTL
    pub fn cart_store(&self) -> CartStore {
        self.cache.cart_store(self.config.cart_ttl_secs)
    }

    /// Refresh-token denylist
    pub fn token_denylist(&self) -> TokenDenylist {
        self.cache.token_denylist()
    }

    /// Image store handle
    pub fn image_store(&self) -> ImageStore {
        self.images.clone()
    }

    /// Sale lifecycle manager over this state's stores
    pub fn sales_manager(&self) -> SalesManager {
        SalesManager::new(self.db.clone(), self.cart_store())
    }
}
