use anyhow::{ensure, Result};
use lapse_core::{Store, StoreConfig};
use std::fmt;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Values of different kinds sharing one store
#[derive(Debug, Clone, PartialEq)]
enum Setting {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Text(text) => f.write_str(text),
            Setting::Number(number) => write!(f, "{number}"),
            Setting::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lapse_demo=info,lapse_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StoreConfig::from_env()?;
    tracing::info!("Lapse demo");
    tracing::info!("   Sweep interval: {:?}", config.sweep_interval);

    let store = Store::with_config(config);

    basic_operations(&store)?;
    expiration(&store).await?;

    store.close();
    tracing::info!("Done");

    Ok(())
}

/// Set, read, list, delete and clear without TTLs
fn basic_operations(store: &Store<Setting>) -> Result<()> {
    store.set("name", Setting::Text("Lapse".to_string()), None);
    store.set("version", Setting::Number(1.0), None);
    store.set("active", Setting::Flag(true), None);

    if let Some(name) = store.get("name") {
        tracing::info!("Cache name: {}", name);
    }

    let mut keys = store.keys();
    keys.sort();
    tracing::info!("All cache keys: {:?}", keys);

    store.delete("active");
    ensure!(store.get("active").is_none(), "'active' should be gone after delete");
    tracing::info!("Key 'active' has been removed");

    let dropped = store.clear();
    tracing::info!(dropped, "Cache size after clear: {} keys", store.keys().len());

    Ok(())
}

/// One entry with a short TTL next to a permanent one
async fn expiration(store: &Store<Setting>) -> Result<()> {
    store.set("session", Setting::Text("alice".to_string()), Some(Duration::from_secs(2)));
    store.set("motd", Setting::Text("hello".to_string()), None);

    ensure!(store.contains_key("session"), "session should be live right after set");
    tracing::info!("Session TTL: {:?}", store.ttl("session").flatten());

    tokio::time::sleep(Duration::from_secs(3)).await;

    ensure!(store.get("session").is_none(), "session should have expired");
    ensure!(
        store.get("motd") == Some(Setting::Text("hello".to_string())),
        "motd has no TTL and should survive"
    );
    tracing::info!("Session expired, motd still present");

    Ok(())
}
