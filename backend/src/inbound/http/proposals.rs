//! Proposal HTTP handlers.
//!
//! ```text
//! POST   /api/v1/trips/{tripId}/proposals/detect
//! GET    /api/v1/trips/{tripId}/proposals
//! POST   /api/v1/trips/{tripId}/proposals
//! POST   /api/v1/trips/{tripId}/proposals/{proposalId}/convert
//! GET    /api/v1/proposals/{proposalId}
//! PATCH  /api/v1/proposals/{proposalId}
//! DELETE /api/v1/proposals/{proposalId}
//! POST   /api/v1/proposals/{proposalId}/activities
//! DELETE /api/v1/proposals/{proposalId}/activities/{cardId}
//! PUT    /api/v1/proposals/{proposalId}/schedule
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    AddProposalActivityRequest, AssignScheduleRequest, ConvertProposalRequest,
    CreateProposalRequest, UpdateProposalRequest,
};
use crate::domain::proposals::{Proposal, ProposalActivity, ProposalMetrics, ScheduleEntry};
use crate::domain::{CardId, Error, ProposalId, TripId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_date, parse_uuid};

const TRIP_ID: FieldName = FieldName::new("tripId");
const PROPOSAL_ID: FieldName = FieldName::new("proposalId");
const CARD_ID: FieldName = FieldName::new("cardId");

/// Request payload for creating a manual proposal.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalBody {
    #[schema(example = "Kyoto day")]
    pub name: String,
    #[schema(example = "#3B82F6")]
    pub color: Option<String>,
}

/// Request payload for a partial proposal update.
///
/// An absent `date` leaves the date alone; `"date": null` clears it.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProposalBody {
    pub name: Option<String>,
    pub color: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date, example = "2024-05-03")]
    pub date: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Request payload for adding a card to a proposal.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddActivityBody {
    #[schema(format = "uuid")]
    pub card_id: String,
    #[schema(minimum = 1)]
    pub day_number: Option<i32>,
}

/// One schedule slot.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntryBody {
    #[schema(format = "uuid")]
    pub card_id: String,
    #[schema(minimum = 1)]
    pub day_number: i32,
    #[schema(minimum = 0)]
    pub order_in_day: i32,
}

/// Request payload for assigning a schedule.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignScheduleBody {
    pub entries: Vec<ScheduleEntryBody>,
}

/// Cached or freshly computed aggregates of a proposal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalMetricsBody {
    pub total_budget: f64,
    pub activity_count: usize,
    pub total_distance: f64,
}

impl From<ProposalMetrics> for ProposalMetricsBody {
    fn from(value: ProposalMetrics) -> Self {
        Self {
            total_budget: value.total_budget,
            activity_count: value.activity_count,
            total_distance: value.total_distance,
        }
    }
}

/// A card's membership in a proposal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalActivityBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub card_id: String,
    pub day_number: Option<i32>,
    pub order_in_day: Option<i32>,
    pub position: i32,
}

impl From<ProposalActivity> for ProposalActivityBody {
    fn from(value: ProposalActivity) -> Self {
        Self {
            id: value.id.to_string(),
            card_id: value.card_id.to_string(),
            day_number: value.day_number,
            order_in_day: value.order_in_day,
            position: value.position,
        }
    }
}

/// Response payload for a proposal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub trip_id: String,
    pub name: String,
    pub color: String,
    #[schema(example = "detected")]
    pub origin: String,
    #[schema(format = "uuid")]
    pub start_card_id: Option<String>,
    pub is_official: bool,
    #[schema(format = Date)]
    pub date: Option<String>,
    pub metrics: ProposalMetricsBody,
    pub activities: Vec<ProposalActivityBody>,
}

impl From<Proposal> for ProposalResponse {
    fn from(value: Proposal) -> Self {
        Self {
            id: value.id.to_string(),
            trip_id: value.trip_id.to_string(),
            name: value.name.into(),
            color: value.color.into(),
            origin: value.origin.as_str().to_owned(),
            start_card_id: value.start_card_id.map(|id| id.to_string()),
            is_official: value.is_official,
            date: value.date.map(|date| date.format("%Y-%m-%d").to_string()),
            metrics: value.metrics.into(),
            activities: value
                .activities
                .into_iter()
                .map(ProposalActivityBody::from)
                .collect(),
        }
    }
}

fn responses(proposals: Vec<Proposal>) -> Vec<ProposalResponse> {
    proposals.into_iter().map(ProposalResponse::from).collect()
}

fn trip_id(raw: &str) -> Result<TripId, Error> {
    parse_uuid(raw, TRIP_ID).map(TripId::from_uuid)
}

fn proposal_id(raw: &str) -> Result<ProposalId, Error> {
    parse_uuid(raw, PROPOSAL_ID).map(ProposalId::from_uuid)
}

fn card_id(raw: &str) -> Result<CardId, Error> {
    parse_uuid(raw, CARD_ID).map(CardId::from_uuid)
}

fn parse_update(
    proposal_id: ProposalId,
    body: UpdateProposalBody,
) -> Result<UpdateProposalRequest, Error> {
    let date = match body.date {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) => Some(Some(parse_date(&raw, FieldName::new("date"))?)),
    };
    Ok(UpdateProposalRequest {
        proposal_id,
        name: body.name,
        color: body.color,
        date,
    })
}

fn parse_schedule(
    proposal_id: ProposalId,
    body: AssignScheduleBody,
) -> Result<AssignScheduleRequest, Error> {
    let entries = body
        .entries
        .into_iter()
        .map(|entry| {
            Ok(ScheduleEntry {
                card_id: card_id(&entry.card_id)?,
                day_number: entry.day_number,
                order_in_day: entry.order_in_day,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(AssignScheduleRequest {
        proposal_id,
        entries,
    })
}

/// Re-detect a trip's proposals from its canvas graph.
#[utoipa::path(
    post,
    path = "/api/v1/trips/{tripId}/proposals/detect",
    params(("tripId" = String, Path, description = "Trip identifier")),
    responses(
        (status = 200, description = "Detected proposals", body = [ProposalResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Trip not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["proposals"],
    operation_id = "detectProposals"
)]
#[post("/trips/{trip_id}/proposals/detect")]
pub async fn detect_proposals(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ProposalResponse>>> {
    let trip_id = trip_id(&path.into_inner())?;
    let detected = state.proposals.detect(trip_id).await?;
    Ok(web::Json(responses(detected)))
}

/// List a trip's proposals with freshly computed metrics.
#[utoipa::path(
    get,
    path = "/api/v1/trips/{tripId}/proposals",
    params(("tripId" = String, Path, description = "Trip identifier")),
    responses(
        (status = 200, description = "Proposals of the trip", body = [ProposalResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Trip not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["proposals"],
    operation_id = "listProposals"
)]
#[get("/trips/{trip_id}/proposals")]
pub async fn list_proposals(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ProposalResponse>>> {
    let trip_id = trip_id(&path.into_inner())?;
    let proposals = state.proposals_query.list(trip_id).await?;
    Ok(web::Json(responses(proposals)))
}

/// Create a manual proposal.
#[utoipa::path(
    post,
    path = "/api/v1/trips/{tripId}/proposals",
    params(("tripId" = String, Path, description = "Trip identifier")),
    request_body = CreateProposalBody,
    responses(
        (status = 201, description = "Proposal created", body = ProposalResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Trip not found", body = ErrorSchema)
    ),
    tags = ["proposals"],
    operation_id = "createProposal"
)]
#[post("/trips/{trip_id}/proposals")]
pub async fn create_proposal(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<CreateProposalBody>,
) -> ApiResult<HttpResponse> {
    let trip_id = trip_id(&path.into_inner())?;
    let CreateProposalBody { name, color } = payload.into_inner();
    let created = state
        .proposals
        .create(CreateProposalRequest {
            trip_id,
            name,
            color,
        })
        .await?;
    Ok(HttpResponse::Created().json(ProposalResponse::from(created)))
}

/// Fetch one proposal.
#[utoipa::path(
    get,
    path = "/api/v1/proposals/{proposalId}",
    params(("proposalId" = String, Path, description = "Proposal identifier")),
    responses(
        (status = 200, description = "Proposal", body = ProposalResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Proposal not found", body = ErrorSchema)
    ),
    tags = ["proposals"],
    operation_id = "getProposal"
)]
#[get("/proposals/{proposal_id}")]
pub async fn get_proposal(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProposalResponse>> {
    let proposal_id = proposal_id(&path.into_inner())?;
    let proposal = state.proposals_query.get(proposal_id).await?;
    Ok(web::Json(proposal.into()))
}

/// Rename, recolour or (re)date a proposal.
#[utoipa::path(
    patch,
    path = "/api/v1/proposals/{proposalId}",
    params(("proposalId" = String, Path, description = "Proposal identifier")),
    request_body = UpdateProposalBody,
    responses(
        (status = 200, description = "Updated proposal", body = ProposalResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Proposal not found", body = ErrorSchema)
    ),
    tags = ["proposals"],
    operation_id = "updateProposal"
)]
#[patch("/proposals/{proposal_id}")]
pub async fn update_proposal(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateProposalBody>,
) -> ApiResult<web::Json<ProposalResponse>> {
    let proposal_id = proposal_id(&path.into_inner())?;
    let request = parse_update(proposal_id, payload.into_inner())?;
    let updated = state.proposals.update(request).await?;
    Ok(web::Json(updated.into()))
}

/// Delete a proposal.
#[utoipa::path(
    delete,
    path = "/api/v1/proposals/{proposalId}",
    params(("proposalId" = String, Path, description = "Proposal identifier")),
    responses(
        (status = 204, description = "Proposal deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Proposal not found", body = ErrorSchema)
    ),
    tags = ["proposals"],
    operation_id = "deleteProposal"
)]
#[delete("/proposals/{proposal_id}")]
pub async fn delete_proposal(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let proposal_id = proposal_id(&path.into_inner())?;
    state.proposals.delete(proposal_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Add a card to a proposal.
#[utoipa::path(
    post,
    path = "/api/v1/proposals/{proposalId}/activities",
    params(("proposalId" = String, Path, description = "Proposal identifier")),
    request_body = AddActivityBody,
    responses(
        (status = 201, description = "Membership created", body = ProposalActivityBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Proposal or card not found", body = ErrorSchema),
        (status = 409, description = "Card already in the proposal", body = ErrorSchema)
    ),
    tags = ["proposals"],
    operation_id = "addProposalActivity"
)]
#[post("/proposals/{proposal_id}/activities")]
pub async fn add_proposal_activity(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<AddActivityBody>,
) -> ApiResult<HttpResponse> {
    let proposal_id = proposal_id(&path.into_inner())?;
    let AddActivityBody {
        card_id: raw_card_id,
        day_number,
    } = payload.into_inner();
    let activity = state
        .proposals
        .add_activity(AddProposalActivityRequest {
            proposal_id,
            card_id: card_id(&raw_card_id)?,
            day_number,
        })
        .await?;
    Ok(HttpResponse::Created().json(ProposalActivityBody::from(activity)))
}

/// Remove a card from a proposal.
#[utoipa::path(
    delete,
    path = "/api/v1/proposals/{proposalId}/activities/{cardId}",
    params(
        ("proposalId" = String, Path, description = "Proposal identifier"),
        ("cardId" = String, Path, description = "Card identifier")
    ),
    responses(
        (status = 204, description = "Membership removed"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Membership not found", body = ErrorSchema)
    ),
    tags = ["proposals"],
    operation_id = "removeProposalActivity"
)]
#[delete("/proposals/{proposal_id}/activities/{card_id}")]
pub async fn remove_proposal_activity(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (raw_proposal_id, raw_card_id) = path.into_inner();
    let proposal_id = proposal_id(&raw_proposal_id)?;
    let card_id = card_id(&raw_card_id)?;
    state.proposals.remove_activity(proposal_id, card_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Assign days and orders to a proposal's cards in one batch.
#[utoipa::path(
    put,
    path = "/api/v1/proposals/{proposalId}/schedule",
    params(("proposalId" = String, Path, description = "Proposal identifier")),
    request_body = AssignScheduleBody,
    responses(
        (status = 204, description = "Schedule stored"),
        (status = 400, description = "Invalid schedule", body = ErrorSchema),
        (status = 404, description = "Proposal not found", body = ErrorSchema)
    ),
    tags = ["proposals"],
    operation_id = "assignProposalSchedule"
)]
#[put("/proposals/{proposal_id}/schedule")]
pub async fn assign_schedule(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<AssignScheduleBody>,
) -> ApiResult<HttpResponse> {
    let proposal_id = proposal_id(&path.into_inner())?;
    let request = parse_schedule(proposal_id, payload.into_inner())?;
    state.proposals.assign_schedule(request).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Promote a proposal into the trip's canonical itinerary.
#[utoipa::path(
    post,
    path = "/api/v1/trips/{tripId}/proposals/{proposalId}/convert",
    params(
        ("tripId" = String, Path, description = "Trip identifier"),
        ("proposalId" = String, Path, description = "Proposal identifier")
    ),
    responses(
        (status = 200, description = "Promoted proposal", body = ProposalResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Trip, proposal or card not found", body = ErrorSchema),
        (status = 422, description = "Proposal or trip is missing a date", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["proposals"],
    operation_id = "convertProposal"
)]
#[post("/trips/{trip_id}/proposals/{proposal_id}/convert")]
pub async fn convert_proposal(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<ProposalResponse>> {
    let (raw_trip_id, raw_proposal_id) = path.into_inner();
    let request = ConvertProposalRequest {
        trip_id: trip_id(&raw_trip_id)?,
        proposal_id: proposal_id(&raw_proposal_id)?,
    };
    let promoted = state.proposals.convert(request).await?;
    Ok(web::Json(promoted.into()))
}

/// Register every proposal route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(detect_proposals)
        .service(list_proposals)
        .service(create_proposal)
        .service(convert_proposal)
        .service(get_proposal)
        .service(update_proposal)
        .service(delete_proposal)
        .service(add_proposal_activity)
        .service(remove_proposal_activity)
        .service(assign_schedule);
}

#[cfg(test)]
#[path = "proposals_tests.rs"]
mod tests;
