use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Path},
    http::{HeaderMap, StatusCode},
    response::Json as RespJson,
    routing::get,
    Router,
};
use uuid::Uuid;

use super::auth::authenticate;
use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::model::patient::{CreatePatientRequest, Patient, UpdatePatientRequest};

pub fn patients_router() -> Router {
    Router::new()
        .route("/", get(list_patients).post(create_patient)) // GET, POST /api/patients
        .route(
            "/:id",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
}

fn parse_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| {
        tracing::warn!("❌ Invalid UUID format: {} - Error: {}", id, e);
        ApiError::BadRequest(format!("Invalid patient ID format: {e}"))
    })
}

pub async fn create_patient(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    request: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, RespJson<Patient>)> {
    authenticate(&headers, &state).await?;
    let Json(request) = request.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let patient = state.patients.insert_patient(request.validate()?).await?;
    tracing::info!("✅ Patient created: {}", patient.id);
    Ok((StatusCode::CREATED, RespJson(patient)))
}

pub async fn list_patients(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> ApiResult<RespJson<Vec<Patient>>> {
    authenticate(&headers, &state).await?;
    Ok(RespJson(state.patients.list_patients().await?))
}

pub async fn get_patient(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<RespJson<Patient>> {
    authenticate(&headers, &state).await?;
    let id = parse_id(&id)?;

    state
        .patients
        .get_patient(id)
        .await?
        .map(RespJson)
        .ok_or(ApiError::NotFound("Patient"))
}

pub async fn update_patient(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    request: Result<Json<UpdatePatientRequest>, JsonRejection>,
) -> ApiResult<RespJson<Patient>> {
    authenticate(&headers, &state).await?;
    let id = parse_id(&id)?;
    let Json(request) = request.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let patient = state
        .patients
        .update_patient(id, request.validate()?)
        .await?
        .ok_or(ApiError::NotFound("Patient"))?;
    tracing::info!("✅ Patient updated: {}", patient.id);
    Ok(RespJson(patient))
}

pub async fn delete_patient(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<RespJson<serde_json::Value>> {
    authenticate(&headers, &state).await?;
    let id = parse_id(&id)?;

    if !state.patients.delete_patient(id).await? {
        return Err(ApiError::NotFound("Patient"));
    }
    tracing::info!("✅ Patient deleted: {}", id);
    Ok(RespJson(serde_json::json!({
        "message": "Patient deleted",
        "id": id,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::auth::tests::{bearer, registered_token, state};

    fn grace() -> CreatePatientRequest {
        CreatePatientRequest {
            name: Some("Grace".into()),
            age: Some(85),
            gender: Some("female".into()),
        }
    }

    #[tokio::test]
    async fn requires_authentication() {
        let err = list_patients(Extension(state()), HeaderMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_age_is_bad_request() {
        let state = state();
        let headers = bearer(&registered_token(&state).await);
        let request = CreatePatientRequest {
            age: None,
            ..grace()
        };
        let err = create_patient(Extension(state), headers, Ok(Json(request)))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Patient validation failed: age is required");
    }

    #[tokio::test]
    async fn full_lifecycle() {
        let state = state();
        let headers = bearer(&registered_token(&state).await);

        let (status, RespJson(created)) =
            create_patient(Extension(state.clone()), headers.clone(), Ok(Json(grace())))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let RespJson(fetched) = get_patient(
            Extension(state.clone()),
            headers.clone(),
            Path(created.id.to_string()),
        )
        .await
        .unwrap();
        assert_eq!(fetched, created);

        let RespJson(updated) = update_patient(
            Extension(state.clone()),
            headers.clone(),
            Path(created.id.to_string()),
            Ok(Json(UpdatePatientRequest {
                gender: Some("F".into()),
                ..Default::default()
            })),
        )
        .await
        .unwrap();
        assert_eq!(updated.gender, "F");
        assert_eq!(updated.created_at, created.created_at);

        let RespJson(all) = list_patients(Extension(state.clone()), headers.clone())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);

        delete_patient(
            Extension(state.clone()),
            headers.clone(),
            Path(created.id.to_string()),
        )
        .await
        .unwrap();
        let err = get_patient(Extension(state), headers, Path(created.id.to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_id_is_bad_request() {
        let state = state();
        let headers = bearer(&registered_token(&state).await);
        let err = delete_patient(Extension(state), headers, Path("default-id".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
