//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every proposal endpoint and the health probes along
//! with the request/response DTOs and the error wrappers from
//! [`crate::inbound::http::schemas`]. Swagger UI serves it in debug builds
//! and the `openapi_dump` binary prints it for client generators.

use utoipa::OpenApi;

use crate::inbound::http::proposals::{
    AddActivityBody, AssignScheduleBody, CreateProposalBody, ProposalActivityBody,
    ProposalMetricsBody, ProposalResponse, ScheduleEntryBody, UpdateProposalBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Trip canvas proposals API",
        description = "Detect, curate, schedule and convert itinerary proposals drawn on a trip canvas."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::proposals::detect_proposals,
        crate::inbound::http::proposals::list_proposals,
        crate::inbound::http::proposals::create_proposal,
        crate::inbound::http::proposals::get_proposal,
        crate::inbound::http::proposals::update_proposal,
        crate::inbound::http::proposals::delete_proposal,
        crate::inbound::http::proposals::add_proposal_activity,
        crate::inbound::http::proposals::remove_proposal_activity,
        crate::inbound::http::proposals::assign_schedule,
        crate::inbound::http::proposals::convert_proposal,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CreateProposalBody,
        UpdateProposalBody,
        AddActivityBody,
        ScheduleEntryBody,
        AssignScheduleBody,
        ProposalMetricsBody,
        ProposalActivityBody,
        ProposalResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "proposals", description = "Itinerary proposals of a trip"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
