//! PostgreSQL-backed `ItineraryRepository` implementation using Diesel ORM.
//!
//! A conversion is applied in one transaction. The transaction first takes
//! `pg_advisory_xact_lock` for every `(trip, day)` it writes to, in ascending
//! day order, so concurrent conversions touching the same day serialise and
//! never deadlock against each other.
//!
//! Only the proposal's own day is replaced. Activities scheduled onto other
//! days are added next to whatever those days already hold.

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ItineraryRepository, ItineraryRepositoryError};
use crate::domain::proposals::{ItineraryConversion, Proposal};
use crate::domain::trip::{TRIP_STATUS_PLANNING, Trip};
use crate::domain::{ProposalId, TripId};

use super::diesel_basic_error_mapping::{TxError, map_basic_diesel_error, map_basic_pool_error};
use super::diesel_proposal_repository::proposal_from_rows;
use super::models::{
    NewActivityParticipantRow, NewItineraryActivityRow, NewTransportLegRow, ProposalActivityRow,
    ProposalRow, TripRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    activity_participants, itinerary_activities, proposal_activities, proposals, transport_legs,
    trips,
};

/// Diesel-backed implementation of the itinerary repository port.
#[derive(Clone)]
pub struct DieselItineraryRepository {
    pool: DbPool,
}

impl DieselItineraryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type Tx<T> = Result<T, TxError<ItineraryRepositoryError>>;

fn map_pool_error(error: PoolError) -> ItineraryRepositoryError {
    map_basic_pool_error(error, ItineraryRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ItineraryRepositoryError {
    map_basic_diesel_error(
        error,
        ItineraryRepositoryError::query,
        ItineraryRepositoryError::connection,
    )
}

fn trip_from_row(row: TripRow) -> Trip {
    Trip {
        id: TripId::from_uuid(row.id),
        start_date: row.start_date,
        status: row.status,
    }
}

/// Every day a conversion writes to, ascending.
fn locked_days(conversion: &ItineraryConversion) -> BTreeSet<i32> {
    conversion
        .activities
        .iter()
        .map(|activity| activity.day_number)
        .chain(std::iter::once(conversion.day_number))
        .collect()
}

async fn lock_day(conn: &mut AsyncPgConnection, trip_id: &TripId, day: i32) -> QueryResult<()> {
    diesel::sql_query("SELECT pg_advisory_xact_lock(hashtext($1), $2)")
        .bind::<Text, _>(trip_id.to_string())
        .bind::<Integer, _>(day)
        .execute(conn)
        .await?;
    Ok(())
}

/// Make `proposal_id` the only official proposal on its date.
async fn promote(conn: &mut AsyncPgConnection, conversion: &ItineraryConversion) -> Tx<()> {
    let proposal_id = conversion.proposal_id.as_uuid();
    diesel::update(
        proposals::table
            .filter(proposals::trip_id.eq(conversion.trip_id.as_uuid()))
            .filter(proposals::proposal_date.eq(conversion.date))
            .filter(proposals::id.ne(proposal_id))
            .filter(proposals::is_official.eq(true)),
    )
    .set(proposals::is_official.eq(false))
    .execute(conn)
    .await?;

    let promoted = diesel::update(
        proposals::table
            .find(proposal_id)
            .filter(proposals::trip_id.eq(conversion.trip_id.as_uuid())),
    )
    .set(proposals::is_official.eq(true))
    .execute(conn)
    .await?;
    if promoted == 0 {
        return Err(TxError::Aborted(
            ItineraryRepositoryError::proposal_not_found(conversion.proposal_id),
        ));
    }

    diesel::update(trips::table.find(conversion.trip_id.as_uuid()))
        .set(trips::status.eq(TRIP_STATUS_PLANNING))
        .execute(conn)
        .await?;
    Ok(())
}

/// The one itinerary day whose prior activities a conversion deletes.
fn replaced_day(conversion: &ItineraryConversion) -> i32 {
    conversion.day_number
}

/// Replace the proposal day's itinerary activities and insert the plan.
async fn rewrite_day(
    conn: &mut AsyncPgConnection,
    conversion: &ItineraryConversion,
) -> QueryResult<()> {
    diesel::delete(
        itinerary_activities::table
            .filter(itinerary_activities::trip_id.eq(conversion.trip_id.as_uuid()))
            .filter(itinerary_activities::day_number.eq(replaced_day(conversion))),
    )
    .execute(conn)
    .await?;

    if conversion.activities.is_empty() {
        return Ok(());
    }

    let activities: Vec<NewItineraryActivityRow<'_>> = conversion
        .activities
        .iter()
        .map(|draft| NewItineraryActivityRow {
            id: *draft.id.as_uuid(),
            trip_id: *draft.trip_id.as_uuid(),
            day_number: draft.day_number,
            order_in_day: draft.order_in_day,
            title: &draft.title,
            category: draft.category.as_str(),
            location: draft.location.as_deref(),
            start_at: draft.start_at,
            end_at: draft.end_at,
            cost: draft.cost,
            budget_category: draft.budget_category.as_deref(),
            memo: draft.memo.as_deref(),
            is_completed: draft.is_completed,
            source_card_id: Some(*draft.source_card_id.as_uuid()),
            from_canvas: draft.from_canvas,
        })
        .collect();
    diesel::insert_into(itinerary_activities::table)
        .values(&activities)
        .execute(conn)
        .await?;

    if !conversion.participants.is_empty() {
        let participants: Vec<NewActivityParticipantRow> = conversion
            .participants
            .iter()
            .map(|draft| NewActivityParticipantRow {
                activity_id: *draft.activity_id.as_uuid(),
                participant_id: draft.participant_id,
            })
            .collect();
        diesel::insert_into(activity_participants::table)
            .values(&participants)
            .on_conflict_do_nothing()
            .execute(conn)
            .await?;
    }

    if !conversion.transport_legs.is_empty() {
        let legs: Vec<NewTransportLegRow<'_>> = conversion
            .transport_legs
            .iter()
            .map(|draft| NewTransportLegRow {
                id: draft.id,
                activity_id: *draft.activity_id.as_uuid(),
                source_connection_id: Some(*draft.source_connection_id.as_uuid()),
                mode: draft.mode.as_str(),
                duration_minutes: draft.duration_minutes,
                distance_km: draft.distance_km,
                cost: draft.cost,
                route: draft.route.as_ref(),
                is_auto_derived: draft.is_auto_derived,
            })
            .collect();
        diesel::insert_into(transport_legs::table)
            .values(&legs)
            .execute(conn)
            .await?;
    }
    Ok(())
}

async fn reload_proposal(conn: &mut AsyncPgConnection, proposal_id: &ProposalId) -> Tx<Proposal> {
    let row: ProposalRow = proposals::table
        .find(proposal_id.as_uuid())
        .select(ProposalRow::as_select())
        .first(conn)
        .await?;
    let activities: Vec<ProposalActivityRow> = proposal_activities::table
        .filter(proposal_activities::proposal_id.eq(row.id))
        .order(proposal_activities::position.asc())
        .select(ProposalActivityRow::as_select())
        .load(conn)
        .await?;
    proposal_from_rows(row, activities)
        .map_err(|message| TxError::Aborted(ItineraryRepositoryError::query(message)))
}

#[async_trait]
impl ItineraryRepository for DieselItineraryRepository {
    async fn find_trip(&self, trip_id: &TripId) -> Result<Option<Trip>, ItineraryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TripRow> = trips::table
            .find(trip_id.as_uuid())
            .select(TripRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(trip_from_row))
    }

    async fn apply_conversion(
        &self,
        conversion: &ItineraryConversion,
    ) -> Result<Proposal, ItineraryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let days = locked_days(conversion);
        conn.transaction::<_, TxError<ItineraryRepositoryError>, _>(|conn| {
            async move {
                for day in &days {
                    lock_day(conn, &conversion.trip_id, *day).await?;
                }
                promote(conn, conversion).await?;
                rewrite_day(conn, conversion).await?;
                reload_proposal(conn, &conversion.proposal_id).await
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(map_diesel_error))
    }
}
