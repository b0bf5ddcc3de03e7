use async_trait::async_trait;
use entity::participants;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter,
};

use crate::domain::{
    error::DomainError,
    models::{email::EmailAddress, participant::Participant},
    repositories::enrollment_repository::EnrollmentRepository,
    services::enrollment_rules::{check_signup, check_unregister},
};
use crate::infrastructure::{
    activity_repository::{capacity_of, count_participants, find_by_name},
    begin_serializable, conflict_or_db_err, db_err,
};

const ALREADY_SIGNED_UP: &str = "Student is already signed up";

#[derive(Clone)]
pub struct SeaOrmEnrollmentRepository {
    db: DatabaseConnection,
}

impl SeaOrmEnrollmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EnrollmentRepository for SeaOrmEnrollmentRepository {
    async fn signup(
        &self,
        activity_name: &str,
        email: &EmailAddress,
    ) -> Result<Participant, DomainError> {
        let txn = begin_serializable(&self.db).await?;

        let activity = find_by_name(&txn, activity_name)
            .await?
            .ok_or(DomainError::NotFound("Activity"))?;
        let capacity = capacity_of(&activity)?;

        let existing = participants::Entity::find()
            .filter(participants::Column::ActivityId.eq(activity.id))
            .filter(participants::Column::Email.eq(email.as_str()))
            .one(&txn)
            .await
            .map_err(db_err)?;
        let enrolled = count_participants(&txn, activity.id).await?;

        check_signup(existing.is_some(), enrolled, capacity)?;

        // The unique index settles a concurrent duplicate that slipped past the read above.
        let row = participants::ActiveModel {
            email: Set(email.as_str().to_string()),
            activity_id: Set(activity.id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| conflict_or_db_err(e, ALREADY_SIGNED_UP))?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(
            activity = %activity.name,
            %email,
            enrolled = enrolled + 1,
            capacity = capacity.get(),
            "participant signed up"
        );
        Ok(Participant::new(row.id, row.activity_id, email.clone()))
    }

    async fn unregister(
        &self,
        activity_name: &str,
        email: &EmailAddress,
    ) -> Result<(), DomainError> {
        let txn = begin_serializable(&self.db).await?;

        let activity = find_by_name(&txn, activity_name)
            .await?
            .ok_or(DomainError::NotFound("Activity"))?;

        let existing = participants::Entity::find()
            .filter(participants::Column::ActivityId.eq(activity.id))
            .filter(participants::Column::Email.eq(email.as_str()))
            .one(&txn)
            .await
            .map_err(db_err)?;
        check_unregister(existing.is_some())?;

        if let Some(row) = existing {
            row.delete(&txn).await.map_err(db_err)?;
        }
        txn.commit().await.map_err(db_err)?;

        tracing::info!(activity = %activity.name, %email, "participant unregistered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            models::activity::NewActivity, repositories::activity_repository::ActivityRepository,
        },
        infrastructure::{
            activity_repository::SeaOrmActivityRepository, test_support::memory_db,
        },
    };

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::parse(raw).unwrap()
    }

    async fn seeded_chess_club() -> (SeaOrmActivityRepository, SeaOrmEnrollmentRepository) {
        let db = memory_db().await;
        let activities = SeaOrmActivityRepository::new(db.clone());
        let enrollment = SeaOrmEnrollmentRepository::new(db);

        let chess = NewActivity::new(
            "Chess Club".into(),
            "Learn strategies and compete in chess tournaments".into(),
            "Fridays, 3:30 PM - 5:00 PM".into(),
            12,
        )
        .unwrap();
        activities.create(chess).await.unwrap();
        for who in ["michael@mergington.edu", "daniel@mergington.edu"] {
            enrollment.signup("Chess Club", &email(who)).await.unwrap();
        }
        (activities, enrollment)
    }

    async fn participants_of(repo: &SeaOrmActivityRepository, name: &str) -> Vec<String> {
        repo.list_all()
            .await
            .unwrap()
            .into_iter()
            .find(|a| a.name() == name)
            .map(|a| a.participants().to_vec())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn chess_club_fills_up_to_exactly_its_capacity() {
        let (activities, enrollment) = seeded_chess_club().await;

        enrollment.signup("Chess Club", &email("third@mergington.edu")).await.unwrap();
        assert_eq!(participants_of(&activities, "Chess Club").await.len(), 3);

        let again = enrollment.signup("Chess Club", &email("michael@mergington.edu")).await;
        assert!(matches!(again, Err(DomainError::Conflict(_))));

        for n in 4..=12 {
            let who = format!("student{n}@mergington.edu");
            enrollment.signup("Chess Club", &email(&who)).await.unwrap();
        }
        assert_eq!(participants_of(&activities, "Chess Club").await.len(), 12);

        let overflow = enrollment.signup("Chess Club", &email("late@mergington.edu")).await;
        assert!(matches!(overflow, Err(DomainError::CapacityExceeded)));
        assert_eq!(participants_of(&activities, "Chess Club").await.len(), 12);

        // Duplicate is still reported as such on a full activity.
        let dup_when_full = enrollment.signup("Chess Club", &email("daniel@mergington.edu")).await;
        assert!(matches!(dup_when_full, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn signup_for_unknown_activity_is_not_found() {
        let (_, enrollment) = seeded_chess_club().await;
        let result = enrollment.signup("Underwater Basket Weaving", &email("a@mergington.edu")).await;
        assert!(matches!(result, Err(DomainError::NotFound("Activity"))));
    }

    #[tokio::test]
    async fn duplicate_signup_leaves_a_single_row() {
        let (activities, enrollment) = seeded_chess_club().await;
        let _ = enrollment.signup("Chess Club", &email("michael@mergington.edu")).await;

        let listed = participants_of(&activities, "Chess Club").await;
        assert_eq!(
            listed.iter().filter(|e| *e == "michael@mergington.edu").count(),
            1
        );
    }

    #[tokio::test]
    async fn unregister_removes_only_that_participant() {
        let (activities, enrollment) = seeded_chess_club().await;

        enrollment
            .unregister("Chess Club", &email("michael@mergington.edu"))
            .await
            .unwrap();

        assert_eq!(
            participants_of(&activities, "Chess Club").await,
            vec!["daniel@mergington.edu".to_string()]
        );
    }

    #[tokio::test]
    async fn unregister_of_absent_email_changes_nothing() {
        let (activities, enrollment) = seeded_chess_club().await;

        let result = enrollment.unregister("Chess Club", &email("ghost@mergington.edu")).await;
        assert!(matches!(result, Err(DomainError::NotRegistered)));
        assert_eq!(participants_of(&activities, "Chess Club").await.len(), 2);

        let result = enrollment.unregister("Nope", &email("michael@mergington.edu")).await;
        assert!(matches!(result, Err(DomainError::NotFound("Activity"))));
    }

    #[tokio::test]
    async fn same_email_may_join_several_activities() {
        let (activities, enrollment) = seeded_chess_club().await;
        let math = NewActivity::new("Math Club".into(), "d".into(), "s".into(), 10).unwrap();
        activities.create(math).await.unwrap();

        enrollment.signup("Math Club", &email("michael@mergington.edu")).await.unwrap();
        assert_eq!(participants_of(&activities, "Math Club").await.len(), 1);
    }
}
