use entity::{activities, participants, users};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, Schema,
    sea_query::{Index, TableCreateStatement},
};

pub const PARTICIPANT_UNIQUE_INDEX: &str = "idx_participants_activity_email";

/// Create the tables and indexes if they are missing. Safe to run on every start.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();

    for table in table_statements(&Schema::new(backend)) {
        db.execute(backend.build(&table)).await?;
    }

    tracing::debug!("schema ready");
    Ok(())
}

/// `CREATE TABLE IF NOT EXISTS` for every table.
///
/// The composite unique index is declared inside the participants table, so it
/// is covered by the same `IF NOT EXISTS` on backends without
/// `CREATE INDEX IF NOT EXISTS` (MySQL).
fn table_statements(schema: &Schema) -> [TableCreateStatement; 3] {
    let mut participants_table = schema.create_table_from_entity(participants::Entity);
    participants_table.index(
        Index::create()
            .name(PARTICIPANT_UNIQUE_INDEX)
            .col(participants::Column::ActivityId)
            .col(participants::Column::Email)
            .unique(),
    );

    let mut tables = [
        schema.create_table_from_entity(activities::Entity),
        participants_table,
        schema.create_table_from_entity(users::Entity),
    ];
    for table in tables.iter_mut() {
        table.if_not_exists();
    }
    tables
}

#[cfg(test)]
mod tests {
    use sea_orm::{ActiveModelTrait, ActiveValue::Set, DbBackend, EntityTrait};

    use super::*;
    use crate::infrastructure::test_support::memory_db;

    #[tokio::test]
    async fn init_is_idempotent() {
        let db = memory_db().await;
        init_schema(&db).await.unwrap();
        assert!(activities::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[test]
    fn every_backend_gets_guarded_ddl_with_the_inline_index() {
        for backend in [DbBackend::MySql, DbBackend::Postgres, DbBackend::Sqlite] {
            let statements: Vec<String> = table_statements(&Schema::new(backend))
                .iter()
                .map(|table| backend.build(table).sql)
                .collect();

            for sql in &statements {
                assert!(
                    sql.starts_with("CREATE TABLE IF NOT EXISTS"),
                    "{backend:?}: {sql}"
                );
            }
            assert!(
                statements[1].contains(PARTICIPANT_UNIQUE_INDEX),
                "{backend:?}: {}",
                statements[1]
            );
            assert!(!statements.iter().any(|sql| sql.contains("CREATE UNIQUE INDEX")));
        }
    }

    #[tokio::test]
    async fn store_rejects_duplicate_enrollment_rows() {
        let db = memory_db().await;
        let activity = activities::ActiveModel {
            name: Set("Chess Club".to_string()),
            description: Set("Strategy".to_string()),
            schedule: Set("Fridays".to_string()),
            max_participants: Set(12),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let row = || participants::ActiveModel {
            email: Set("michael@mergington.edu".to_string()),
            activity_id: Set(activity.id),
            ..Default::default()
        };
        row().insert(&db).await.unwrap();

        let err = row().insert(&db).await.unwrap_err();
        assert!(matches!(
            crate::infrastructure::db_err(err),
            crate::domain::error::RepositoryError::UniqueViolation(_)
        ));
    }
}
