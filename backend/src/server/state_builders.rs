//! Builders for the HTTP state's driving ports.

use std::sync::Arc;

use actix_web::web;

use trip_canvas::domain::ProposalService;
use trip_canvas::domain::ports::{ProposalCommand, ProposalQuery};
use trip_canvas::inbound::http::state::HttpState;
use trip_canvas::outbound::persistence::{
    DbPool, DieselCanvasRepository, DieselItineraryRepository, DieselProposalRepository,
};

use super::ServerConfig;

/// Wrap the pool-backed service as both driving ports. `None` without a pool.
fn build_proposal_ports<Pool, S>(
    pool: &Option<Pool>,
    make_service: impl FnOnce(&Pool) -> S,
) -> Option<(Arc<dyn ProposalCommand>, Arc<dyn ProposalQuery>)>
where
    S: ProposalCommand + ProposalQuery + 'static,
{
    pool.as_ref().map(|pool| {
        let service = Arc::new(make_service(pool));
        (
            service.clone() as Arc<dyn ProposalCommand>,
            service as Arc<dyn ProposalQuery>,
        )
    })
}

fn proposal_service(
    pool: &DbPool,
) -> ProposalService<DieselCanvasRepository, DieselProposalRepository, DieselItineraryRepository>
{
    ProposalService::new(
        Arc::new(DieselCanvasRepository::new(pool.clone())),
        Arc::new(DieselProposalRepository::new(pool.clone())),
        Arc::new(DieselItineraryRepository::new(pool.clone())),
    )
}

/// Build the shared HTTP state from the configured pool.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match build_proposal_ports(&config.db_pool, proposal_service) {
        Some((proposals, proposals_query)) => HttpState::new(proposals, proposals_query),
        None => HttpState::fixtures(),
    };
    web::Data::new(state)
}
