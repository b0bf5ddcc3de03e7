use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json, Router,
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        models::activity::Activity,
        repositories::{
            activity_repository::ActivityRepository, enrollment_repository::EnrollmentRepository,
        },
    },
    presentation::{
        error::ApiError,
        extractors::{AuthenticatedUser, JsonBody, QueryParams, TokenVerifier},
    },
    usecase::{activity_usecase::ActivityUsecase, enrollment_usecase::EnrollmentUsecase},
};

// Request

/// query string carrying the student's email
#[derive(Serialize, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// json for creating an activity
#[derive(Serialize, Deserialize)]
pub struct CreateActivityRequest {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub max_participants: i32,
}

/// json for a partial activity update; absent fields stay as they are
#[derive(Serialize, Deserialize, Default)]
pub struct UpdateActivityRequest {
    pub description: Option<String>,
    pub schedule: Option<String>,
    pub max_participants: Option<i32>,
}

// Response

/// one entry of the `GET /activities` map
#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityDetails {
    pub description: String,
    pub schedule: String,
    pub max_participants: i32,
    pub participants: Vec<String>,
}

impl From<Activity> for ActivityDetails {
    fn from(activity: Activity) -> Self {
        Self {
            description: activity.description().to_string(),
            schedule: activity.schedule().to_string(),
            max_participants: activity.max_participants().get(),
            participants: activity.participants().to_vec(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub max_participants: i32,
}

impl From<Activity> for ActivityInfo {
    fn from(activity: Activity) -> Self {
        Self {
            name: activity.name().to_string(),
            description: activity.description().to_string(),
            schedule: activity.schedule().to_string(),
            max_participants: activity.max_participants().get(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub message: String,
    pub activity: ActivityInfo,
}

/* Router Function and Handler Function */

pub struct ActivityState<A: ActivityRepository, E: EnrollmentRepository> {
    pub activity_service: Arc<ActivityUsecase<A>>,
    pub enrollment_service: Arc<EnrollmentUsecase<E>>,
    pub verifier: TokenVerifier,
}

impl<A: ActivityRepository, E: EnrollmentRepository> Clone for ActivityState<A, E> {
    fn clone(&self) -> Self {
        Self {
            activity_service: Arc::clone(&self.activity_service),
            enrollment_service: Arc::clone(&self.enrollment_service),
            verifier: self.verifier.clone(),
        }
    }
}

impl<A: ActivityRepository, E: EnrollmentRepository> FromRef<ActivityState<A, E>> for TokenVerifier {
    fn from_ref(state: &ActivityState<A, E>) -> Self {
        state.verifier.clone()
    }
}

/// Public catalogue and enrollment routes plus the `/admin` activity routes.
pub fn create_activity_router<
    A: ActivityRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
>(
    activity_service: ActivityUsecase<A>,
    enrollment_service: EnrollmentUsecase<E>,
    verifier: TokenVerifier,
) -> Router {
    let state = ActivityState {
        activity_service: Arc::new(activity_service),
        enrollment_service: Arc::new(enrollment_service),
        verifier,
    };

    Router::new()
        .route("/activities", get(list_activities::<A, E>))
        .route("/activities/{name}/signup", post(signup::<A, E>))
        .route(
            "/activities/{name}/unregister",
            axum::routing::delete(unregister::<A, E>),
        )
        .route("/admin/activities", post(create_activity::<A, E>))
        .route(
            "/admin/activities/{name}",
            put(update_activity::<A, E>).delete(delete_activity::<A, E>),
        )
        .with_state(state)
}

// handler function

async fn list_activities<
    A: ActivityRepository + Send + Sync,
    E: EnrollmentRepository + Send + Sync,
>(
    State(state): State<ActivityState<A, E>>,
) -> Result<Json<BTreeMap<String, ActivityDetails>>, ApiError> {
    let activities = state.activity_service.list_all().await?;
    let by_name = activities
        .into_iter()
        .map(|activity| (activity.name().to_string(), ActivityDetails::from(activity)))
        .collect();
    Ok(Json(by_name))
}

async fn signup<A: ActivityRepository + Send + Sync, E: EnrollmentRepository + Send + Sync>(
    State(state): State<ActivityState<A, E>>,
    Path(name): Path<String>,
    QueryParams(query): QueryParams<EmailQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let participant = state.enrollment_service.signup(&name, &query.email).await?;
    Ok(Json(MessageResponse {
        message: format!("Signed up {} for {}", participant.email(), name),
    }))
}

async fn unregister<A: ActivityRepository + Send + Sync, E: EnrollmentRepository + Send + Sync>(
    State(state): State<ActivityState<A, E>>,
    Path(name): Path<String>,
    QueryParams(query): QueryParams<EmailQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = state
        .enrollment_service
        .unregister(&name, &query.email)
        .await?;
    Ok(Json(MessageResponse {
        message: format!("Unregistered {email} from {name}"),
    }))
}

async fn create_activity<
    A: ActivityRepository + Send + Sync,
    E: EnrollmentRepository + Send + Sync,
>(
    State(state): State<ActivityState<A, E>>,
    AuthenticatedUser(caller): AuthenticatedUser,
    JsonBody(payload): JsonBody<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ActivityResponse>), ApiError> {
    let activity = state
        .activity_service
        .create(
            &caller,
            payload.name,
            payload.description,
            payload.schedule,
            payload.max_participants,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ActivityResponse {
            message: "Activity created successfully".to_string(),
            activity: activity.into(),
        }),
    ))
}

async fn update_activity<
    A: ActivityRepository + Send + Sync,
    E: EnrollmentRepository + Send + Sync,
>(
    State(state): State<ActivityState<A, E>>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(name): Path<String>,
    JsonBody(payload): JsonBody<UpdateActivityRequest>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let activity = state
        .activity_service
        .update(
            &caller,
            &name,
            payload.description,
            payload.schedule,
            payload.max_participants,
        )
        .await?;
    Ok(Json(ActivityResponse {
        message: "Activity updated successfully".to_string(),
        activity: activity.into(),
    }))
}

async fn delete_activity<
    A: ActivityRepository + Send + Sync,
    E: EnrollmentRepository + Send + Sync,
>(
    State(state): State<ActivityState<A, E>>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.activity_service.delete(&caller, &name).await?;
    Ok(Json(MessageResponse {
        message: format!("Activity '{name}' deleted successfully"),
    }))
}
