use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::{AppConfig, JwtConfig};
use crate::store::{DocumentStore, MemoryStore, PgDocumentStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.database_url {
            Some(url) => {
                let pg = PgDocumentStore::connect(url).await?;
                if let Err(e) = pg.migrate().await {
                    warn!(error = %e, "migration failed; continuing");
                }
                info!("using postgres document store");
                Arc::new(pg) as Arc<dyn DocumentStore>
            }
            None => {
                let mem = MemoryStore::new();
                if let Some(path) = &config.seed_file {
                    let raw = std::fs::read_to_string(path)
                        .with_context(|| format!("read seed file {path}"))?;
                    let seed: serde_json::Value =
                        serde_json::from_str(&raw).with_context(|| format!("parse seed file {path}"))?;
                    let n = mem.load_json(&seed)?;
                    info!(documents = n, %path, "seeded in-memory store");
                }
                warn!("DATABASE_URL not set, using in-memory document store");
                Arc::new(mem) as Arc<dyn DocumentStore>
            }
        };

        Ok(Self { store, config })
    }

    pub fn from_parts(store: Arc<dyn DocumentStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// In-memory state with a fixed test configuration.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            seed_file: None,
            home_path: "/".into(),
            host: "127.0.0.1".into(),
            port: 0,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
            },
        });
        Self::from_parts(Arc::new(MemoryStore::new()), config)
    }
}
