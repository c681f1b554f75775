use std::sync::Arc;

use super::{
    config::Config,
    store::{ProfileStore, RedisStore, init_redis},
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ProfileStore>,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let redis_connection = init_redis(&config.redis_url).await;
        let store = Arc::new(RedisStore::new(redis_connection));

        Arc::new(Self { config, store })
    }
}
