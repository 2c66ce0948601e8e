//! Bootcamp endpoints.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/api/v1/bootcamps` | [`get_bootcamps`] |
//! | GET | `/api/v1/bootcamps/{id}` | [`get_bootcamp`] |
//! | POST | `/api/v1/bootcamps` | [`create_bootcamp`] |
//! | PUT | `/api/v1/bootcamps/{id}` | [`update_bootcamp`] |
//! | DELETE | `/api/v1/bootcamps/{id}` | [`delete_bootcamp`] |
//!
//! Each handler returns `Result<Json<Envelope<_>>, ApiError>`; failures are
//! never formatted here.

use std::sync::Arc;

use http::StatusCode;
use serde_json::{Map, Value};

use crate::error::{ApiError, ErrorResponse};
use crate::model::Bootcamp;
use crate::request::Request;
use crate::response::{Envelope, Json};
use crate::router::Router;
use crate::store::{SharedStore, UpdateOptions};

pub const COLLECTION: &str = "/api/v1/bootcamps";
pub const MEMBER: &str = "/api/v1/bootcamps/{id}";

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Registers the five bootcamp routes on `router`.
///
/// The router must carry a [`SharedStore`] in its state.
pub fn routes(router: Router) -> Router {
    router
        .get(COLLECTION, get_bootcamps)
        .post(COLLECTION, create_bootcamp)
        .get(MEMBER, get_bootcamp)
        .put(MEMBER, update_bootcamp)
        .delete(MEMBER, delete_bootcamp)
}

fn store(req: &Request) -> Result<SharedStore, ApiError> {
    req.state::<SharedStore>()
        .map(Arc::clone)
        .ok_or_else(|| ApiError::Unclassified("router has no bootcamp store attached".into()))
}

fn not_found(id: &str) -> ApiError {
    ErrorResponse::new(format!("Bootcamp not found with id of {id}"), StatusCode::NOT_FOUND).into()
}

/// `GET /api/v1/bootcamps`
pub async fn get_bootcamps(req: Request) -> ApiResult<Vec<Bootcamp>> {
    let bootcamps = store(&req)?.find_all().await?;
    Ok(Json(StatusCode::OK, Envelope::list(bootcamps)))
}

/// `GET /api/v1/bootcamps/{id}`
pub async fn get_bootcamp(req: Request) -> ApiResult<Bootcamp> {
    let id = req.require_param("id")?;
    let bootcamp = store(&req)?.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(StatusCode::OK, Envelope::data(bootcamp)))
}

/// `POST /api/v1/bootcamps`
///
/// The body goes to the store as-is; the store's schema decides what is kept.
pub async fn create_bootcamp(req: Request) -> ApiResult<Bootcamp> {
    let payload = req.json_object()?;
    let bootcamp = store(&req)?.create(payload).await?;
    Ok(Json(StatusCode::CREATED, Envelope::data(bootcamp)))
}

/// `PUT /api/v1/bootcamps/{id}`
pub async fn update_bootcamp(req: Request) -> ApiResult<Bootcamp> {
    let id = req.require_param("id")?;
    let payload = req.json_object()?;
    let options = UpdateOptions { return_updated: true, run_validators: true };

    let bootcamp = store(&req)?
        .update_by_id(id, payload, options)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(StatusCode::OK, Envelope::data(bootcamp)))
}

/// `DELETE /api/v1/bootcamps/{id}`
///
/// Answers `{ "success": true, "data": {} }`. A missing bootcamp is a 404,
/// the same as for get and update.
pub async fn delete_bootcamp(req: Request) -> ApiResult<Map<String, Value>> {
    let id = req.require_param("id")?;
    store(&req)?.delete_by_id(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(StatusCode::OK, Envelope::data(Map::new())))
}
