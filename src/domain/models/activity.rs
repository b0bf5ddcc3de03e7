use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Capacity of an activity. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct MaxParticipants(i32);

impl MaxParticipants {
    pub fn new(value: i32) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidMaxParticipants);
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> i32 {
        self.0
    }

    /// Whether `enrolled` participants leave room for one more.
    pub fn has_room_for_another(&self, enrolled: u64) -> bool {
        enrolled < self.0 as u64
    }
}

impl TryFrom<i32> for MaxParticipants {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MaxParticipants> for i32 {
    fn from(value: MaxParticipants) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    name: String,
    description: String,
    schedule: String,
    max_participants: MaxParticipants,
    participants: Vec<String>,
}

impl Activity {
    pub fn reconstruct(
        name: String,
        description: String,
        schedule: String,
        max_participants: MaxParticipants,
        participants: Vec<String>,
    ) -> Self {
        Self {
            name,
            description,
            schedule,
            max_participants,
            participants,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn schedule(&self) -> &str {
        &self.schedule
    }
    pub fn max_participants(&self) -> MaxParticipants {
        self.max_participants
    }
    pub fn participants(&self) -> &[String] {
        &self.participants
    }
}

/// Validated input for a new activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub max_participants: MaxParticipants,
}

impl NewActivity {
    pub fn new(
        name: String,
        description: String,
        schedule: String,
        max_participants: i32,
    ) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::EmptyField("name"));
        }
        Ok(Self {
            name,
            description,
            schedule,
            max_participants: MaxParticipants::new(max_participants)?,
        })
    }
}

/// Partial update of an activity; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityPatch {
    pub description: Option<String>,
    pub schedule: Option<String>,
    pub max_participants: Option<MaxParticipants>,
}

impl ActivityPatch {
    pub fn new(
        description: Option<String>,
        schedule: Option<String>,
        max_participants: Option<i32>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            description,
            schedule,
            max_participants: max_participants.map(MaxParticipants::new).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_must_be_positive() {
        assert!(matches!(
            MaxParticipants::new(0),
            Err(DomainError::InvalidMaxParticipants)
        ));
        assert!(MaxParticipants::new(-3).is_err());
        assert_eq!(MaxParticipants::new(12).unwrap().get(), 12);
    }

    #[test]
    fn room_is_strictly_below_capacity() {
        let max = MaxParticipants::new(2).unwrap();
        assert!(max.has_room_for_another(1));
        assert!(!max.has_room_for_another(2));
        assert!(!max.has_room_for_another(3));
    }

    #[test]
    fn new_activity_requires_a_name() {
        let result = NewActivity::new(" ".into(), "d".into(), "s".into(), 5);
        assert!(matches!(result, Err(DomainError::EmptyField("name"))));
    }

    #[test]
    fn patch_validates_only_given_capacity() {
        assert_eq!(ActivityPatch::new(None, None, None).unwrap(), ActivityPatch::default());
        assert!(ActivityPatch::new(Some("x".into()), None, Some(0)).is_err());
    }
}
