//! PostgreSQL-backed `CanvasRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::canvas::{
    CanvasPosition, CanvasSnapshot, Card, Connection, CustomLocation, TransportMode,
};
use crate::domain::ports::{CanvasRepository, CanvasRepositoryError};
use crate::domain::{CardId, ConnectionId, ProposalId, TripId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CardRow, ConnectionRow};
use super::pool::{DbPool, PoolError};
use super::schema::{canvas_cards, canvas_connections};

/// Diesel-backed implementation of the canvas repository port.
#[derive(Clone)]
pub struct DieselCanvasRepository {
    pool: DbPool,
}

impl DieselCanvasRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CanvasRepositoryError {
    map_basic_pool_error(error, CanvasRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CanvasRepositoryError {
    map_basic_diesel_error(
        error,
        CanvasRepositoryError::query,
        CanvasRepositoryError::connection,
    )
}

/// Convert a card row into the domain card.
pub(super) fn card_from_row(row: CardRow) -> Result<Card, String> {
    let activity_type = row
        .activity_type
        .parse()
        .map_err(|err| format!("card {}: {err}", row.id))?;
    let custom_location = row
        .custom_location
        .map(serde_json::from_value::<CustomLocation>)
        .transpose()
        .map_err(|err| format!("card {}: decode custom location: {err}", row.id))?;
    Ok(Card {
        id: CardId::from_uuid(row.id),
        trip_id: TripId::from_uuid(row.trip_id),
        position: CanvasPosition {
            x: row.position_x,
            y: row.position_y,
        },
        title: row.title,
        activity_type,
        location: row.location,
        custom_location,
        start_time: row.start_time,
        end_time: row.end_time,
        cost: row.cost,
        budget_category: row.budget_category,
        memo: row.memo,
        participants: row.participants,
        is_completed: row.is_completed,
        is_collapsed: row.is_collapsed,
    })
}

/// Convert a connection row into the domain connection.
pub(super) fn connection_from_row(row: ConnectionRow) -> Result<Connection, String> {
    let transport_mode = row
        .transport_mode
        .as_deref()
        .map(str::parse::<TransportMode>)
        .transpose()
        .map_err(|err| format!("connection {}: {err}", row.id))?;
    Ok(Connection {
        id: ConnectionId::from_uuid(row.id),
        trip_id: TripId::from_uuid(row.trip_id),
        source_card_id: CardId::from_uuid(row.source_card_id),
        target_card_id: CardId::from_uuid(row.target_card_id),
        transport_mode,
        duration_minutes: row.duration_minutes,
        distance_km: row.distance_km,
        cost: row.cost,
        route: row.route,
        proposal_id: row.proposal_id.map(ProposalId::from_uuid),
    })
}

/// Raw canvas rows of one trip, in creation order.
pub(super) async fn load_canvas_rows(
    conn: &mut AsyncPgConnection,
    trip_id: &TripId,
) -> QueryResult<(Vec<CardRow>, Vec<ConnectionRow>)> {
    let cards = canvas_cards::table
        .filter(canvas_cards::trip_id.eq(trip_id.as_uuid()))
        .order((canvas_cards::created_at.asc(), canvas_cards::id.asc()))
        .select(CardRow::as_select())
        .load(conn)
        .await?;
    let connections = canvas_connections::table
        .filter(canvas_connections::trip_id.eq(trip_id.as_uuid()))
        .order((canvas_connections::created_at.asc(), canvas_connections::id.asc()))
        .select(ConnectionRow::as_select())
        .load(conn)
        .await?;
    Ok((cards, connections))
}

/// Convert raw canvas rows into a snapshot.
pub(super) fn snapshot_from_rows(
    cards: Vec<CardRow>,
    connections: Vec<ConnectionRow>,
) -> Result<CanvasSnapshot, String> {
    Ok(CanvasSnapshot {
        cards: cards
            .into_iter()
            .map(card_from_row)
            .collect::<Result<_, _>>()?,
        connections: connections
            .into_iter()
            .map(connection_from_row)
            .collect::<Result<_, _>>()?,
    })
}

#[async_trait]
impl CanvasRepository for DieselCanvasRepository {
    async fn load_canvas(&self, trip_id: &TripId) -> Result<CanvasSnapshot, CanvasRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (cards, connections) = load_canvas_rows(&mut conn, trip_id)
            .await
            .map_err(map_diesel_error)?;
        snapshot_from_rows(cards, connections).map_err(CanvasRepositoryError::query)
    }
}
