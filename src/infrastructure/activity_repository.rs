use std::collections::HashMap;

use async_trait::async_trait;
use entity::{activities, participants};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use crate::domain::{
    error::{DomainError, RepositoryError},
    models::activity::{Activity, ActivityPatch, MaxParticipants, NewActivity},
    repositories::activity_repository::ActivityRepository,
    services::enrollment_rules::check_capacity_change,
};
use crate::infrastructure::{begin_serializable, conflict_or_db_err, db_err};

#[derive(Clone)]
pub struct SeaOrmActivityRepository {
    db: DatabaseConnection,
}

impl SeaOrmActivityRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn find_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<Option<activities::Model>, RepositoryError> {
    activities::Entity::find()
        .filter(activities::Column::Name.eq(name))
        .one(conn)
        .await
        .map_err(db_err)
}

pub(crate) async fn count_participants<C: ConnectionTrait>(
    conn: &C,
    activity_id: i32,
) -> Result<u64, RepositoryError> {
    participants::Entity::find()
        .filter(participants::Column::ActivityId.eq(activity_id))
        .count(conn)
        .await
        .map_err(db_err)
}

pub(crate) fn capacity_of(model: &activities::Model) -> Result<MaxParticipants, RepositoryError> {
    MaxParticipants::new(model.max_participants).map_err(|e| {
        RepositoryError::DatabaseError(format!("activity {}: {e}", model.id))
    })
}

async fn participant_emails<C: ConnectionTrait>(
    conn: &C,
    activity_id: i32,
) -> Result<Vec<String>, RepositoryError> {
    let rows = participants::Entity::find()
        .filter(participants::Column::ActivityId.eq(activity_id))
        .order_by_asc(participants::Column::Id)
        .all(conn)
        .await
        .map_err(db_err)?;
    Ok(rows.into_iter().map(|p| p.email).collect())
}

fn to_domain(model: activities::Model, participants: Vec<String>) -> Result<Activity, RepositoryError> {
    let capacity = capacity_of(&model)?;
    Ok(Activity::reconstruct(
        model.name,
        model.description,
        model.schedule,
        capacity,
        participants,
    ))
}

#[async_trait]
impl ActivityRepository for SeaOrmActivityRepository {
    async fn list_all(&self) -> Result<Vec<Activity>, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let models = activities::Entity::find()
            .order_by_asc(activities::Column::Id)
            .all(&txn)
            .await
            .map_err(db_err)?;
        let rows = participants::Entity::find()
            .order_by_asc(participants::Column::Id)
            .all(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        let mut emails: HashMap<i32, Vec<String>> = HashMap::new();
        for row in rows {
            emails.entry(row.activity_id).or_default().push(row.email);
        }

        let activities = models
            .into_iter()
            .map(|model| {
                let participants = emails.remove(&model.id).unwrap_or_default();
                to_domain(model, participants)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(activities)
    }

    async fn create(&self, activity: NewActivity) -> Result<Activity, DomainError> {
        const DUPLICATE: &str = "Activity with this name already exists";

        let txn = self.db.begin().await.map_err(db_err)?;

        if find_by_name(&txn, &activity.name).await?.is_some() {
            return Err(DomainError::Conflict(DUPLICATE.to_string()));
        }

        let model = activities::ActiveModel {
            name: Set(activity.name),
            description: Set(activity.description),
            schedule: Set(activity.schedule),
            max_participants: Set(activity.max_participants.get()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| conflict_or_db_err(e, DUPLICATE))?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(activity = %model.name, id = model.id, "activity created");
        Ok(to_domain(model, Vec::new())?)
    }

    async fn update(&self, name: &str, patch: ActivityPatch) -> Result<Activity, DomainError> {
        let txn = begin_serializable(&self.db).await?;

        let model = find_by_name(&txn, name)
            .await?
            .ok_or(DomainError::NotFound("Activity"))?;

        if let Some(requested) = patch.max_participants {
            let enrolled = count_participants(&txn, model.id).await?;
            check_capacity_change(enrolled, requested)?;
        }

        let model = if patch == ActivityPatch::default() {
            model
        } else {
            let mut active: activities::ActiveModel = model.into();
            if let Some(description) = patch.description {
                active.description = Set(description);
            }
            if let Some(schedule) = patch.schedule {
                active.schedule = Set(schedule);
            }
            if let Some(max_participants) = patch.max_participants {
                active.max_participants = Set(max_participants.get());
            }
            active.update(&txn).await.map_err(db_err)?
        };

        let participants = participant_emails(&txn, model.id).await?;
        txn.commit().await.map_err(db_err)?;

        tracing::info!(activity = %model.name, "activity updated");
        Ok(to_domain(model, participants)?)
    }

    async fn delete(&self, name: &str) -> Result<(), DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = find_by_name(&txn, name)
            .await?
            .ok_or(DomainError::NotFound("Activity"))?;

        // Cascade explicitly: SQLite only enforces ON DELETE when foreign keys are on.
        let removed = participants::Entity::delete_many()
            .filter(participants::Column::ActivityId.eq(model.id))
            .exec(&txn)
            .await
            .map_err(db_err)?
            .rows_affected;
        activities::Entity::delete_by_id(model.id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(activity = %name, participants = removed, "activity deleted");
        Ok(())
    }
}
