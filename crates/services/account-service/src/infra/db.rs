//! Database connection and schema bootstrap.

use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr, Schema,
    Statement,
};

use common::DatabaseConfig;

use crate::repository::entities::user;

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Connect and make sure the `users` table exists.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let connection = SeaDatabase::connect(options).await?;
        let db = Self { connection };
        db.ensure_schema().await?;
        tracing::info!("Database connected and schema ensured");

        Ok(db)
    }

    /// Single-connection in-memory SQLite database (tests and local runs).
    pub async fn connect_in_memory() -> Result<Self, DbErr> {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        };
        Self::connect(&config).await
    }

    /// Create tables from the entity definitions when they are missing.
    pub async fn ensure_schema(&self) -> Result<(), DbErr> {
        let backend = self.connection.get_database_backend();
        let schema = Schema::new(backend);

        let mut create_users = schema.create_table_from_entity(user::Entity);
        create_users.if_not_exists();
        self.connection.execute(backend.build(&create_users)).await?;

        Ok(())
    }

    /// Get a clone of the database connection.
    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }
}
