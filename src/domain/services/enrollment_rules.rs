//! Checks applied to a signup or unregister before the store is touched.
//!
//! Callers gather the facts inside the same transaction that performs the write.

use crate::domain::{error::DomainError, models::activity::MaxParticipants};

/// Duplicate is reported before capacity: a student already on a full
/// activity hears "already signed up", not "full".
pub fn check_signup(
    already_registered: bool,
    enrolled: u64,
    capacity: MaxParticipants,
) -> Result<(), DomainError> {
    if already_registered {
        return Err(DomainError::Conflict(
            "Student is already signed up".to_string(),
        ));
    }
    if !capacity.has_room_for_another(enrolled) {
        return Err(DomainError::CapacityExceeded);
    }
    Ok(())
}

pub fn check_unregister(registered: bool) -> Result<(), DomainError> {
    if registered {
        Ok(())
    } else {
        Err(DomainError::NotRegistered)
    }
}

/// A capacity change may not strand existing participants over the limit.
pub fn check_capacity_change(enrolled: u64, requested: MaxParticipants) -> Result<(), DomainError> {
    if enrolled > requested.get() as u64 {
        return Err(DomainError::CapacityBelowEnrollment {
            requested: requested.get(),
            enrolled,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(n: i32) -> MaxParticipants {
        MaxParticipants::new(n).unwrap()
    }

    #[test]
    fn duplicate_wins_over_full() {
        let err = check_signup(true, 12, cap(12)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn full_activity_rejects_newcomers() {
        assert!(matches!(
            check_signup(false, 12, cap(12)),
            Err(DomainError::CapacityExceeded)
        ));
        assert!(check_signup(false, 11, cap(12)).is_ok());
    }

    #[test]
    fn unregister_requires_existing_enrollment() {
        assert!(matches!(check_unregister(false), Err(DomainError::NotRegistered)));
        assert!(check_unregister(true).is_ok());
    }

    #[test]
    fn capacity_can_shrink_down_to_enrollment() {
        assert!(check_capacity_change(3, cap(3)).is_ok());
        assert!(matches!(
            check_capacity_change(4, cap(3)),
            Err(DomainError::CapacityBelowEnrollment { requested: 3, enrolled: 4 })
        ));
    }
}
