//! ScyllaDB schema creation

use crate::error::PersistenceError;
use scylla::Session;

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(
    session: &Session,
    keyspace: &str,
    replication_factor: u8,
) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create all required tables
pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    // Leads table: one row per submission, updated in place, never deleted
    let leads_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.leads (
            lead_id UUID,
            service_type TEXT,
            fields_json TEXT,
            status TEXT,
            source TEXT,
            created_at BIGINT,
            updated_at BIGINT,
            missing_fields_json TEXT,
            questions_json TEXT,
            email_status TEXT,
            ai_json TEXT,
            ai_brief_json TEXT,
            quality_score INT,
            score_source TEXT,
            clarifications_json TEXT,
            PRIMARY KEY (lead_id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(leads_table, &[])
        .await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create leads table: {}", e)))?;

    // Chat transcript table: one clustered row per turn, ascending turn
    // index preserves arrival order on read
    let chat_turns_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.chat_turns (
            session_id TEXT,
            turn_index BIGINT,
            created_at BIGINT,
            user_text TEXT,
            assistant_text TEXT,
            PRIMARY KEY ((session_id), turn_index)
        ) WITH CLUSTERING ORDER BY (turn_index ASC)
    "#,
        keyspace
    );

    session
        .query_unpaged(chat_turns_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create chat_turns table: {}", e))
        })?;

    tracing::info!("All tables created successfully");
    Ok(())
}
