use folio_common::{connect_to_database, content_tables};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    domain::migration::Migration,
    infrastructure::{persistence::PersistenceAdapter, settings::Settings},
};

pub mod domain;
pub mod infrastructure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    tracing::info!("configuration loaded");

    let database = connect_to_database(&settings.database).await?;
    let persistence = PersistenceAdapter::new(database);

    // bring the database schema in line with the content tables
    let migration = Migration::new(content_tables(), persistence);
    let applied = migration.migrate().await?;
    tracing::info!(applied, "schema migrated");

    Ok(())
}
