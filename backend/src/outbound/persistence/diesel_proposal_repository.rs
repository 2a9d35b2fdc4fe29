//! PostgreSQL-backed `ProposalRepository` implementation using Diesel ORM.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::{exists, max};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ProposalRepository, ProposalRepositoryError};
use crate::domain::proposals::{
    DetectedProposal, NewProposal, NewProposalActivity, Proposal, ProposalActivity, ProposalColor,
    ProposalMetrics, ProposalName, ProposalOrigin, ProposalUpdate, ScheduleEntry,
};
use crate::domain::{CardId, ProposalActivityId, ProposalId, TripId};

use super::diesel_basic_error_mapping::{
    TxError, Violation, map_basic_diesel_error, map_basic_pool_error, violation,
};
use super::models::{
    NewProposalActivityRow, NewProposalRow, ProposalActivityRow, ProposalChangeset, ProposalRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{canvas_cards, canvas_connections, proposal_activities, proposals};

/// Diesel-backed implementation of the proposal repository port.
#[derive(Clone)]
pub struct DieselProposalRepository {
    pool: DbPool,
}

impl DieselProposalRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type Tx<T> = Result<T, TxError<ProposalRepositoryError>>;

fn map_pool_error(error: PoolError) -> ProposalRepositoryError {
    map_basic_pool_error(error, ProposalRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProposalRepositoryError {
    map_basic_diesel_error(
        error,
        ProposalRepositoryError::query,
        ProposalRepositoryError::connection,
    )
}

fn metric_count(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn activity_from_row(row: ProposalActivityRow) -> ProposalActivity {
    ProposalActivity {
        id: ProposalActivityId::from_uuid(row.id),
        proposal_id: ProposalId::from_uuid(row.proposal_id),
        card_id: CardId::from_uuid(row.card_id),
        day_number: row.day_number,
        order_in_day: row.order_in_day,
        position: row.position,
    }
}

/// Convert a proposal row and its membership rows into the domain proposal.
///
/// The cached activity count is ignored in favour of the memberships
/// actually loaded.
pub(super) fn proposal_from_rows(
    row: ProposalRow,
    activities: Vec<ProposalActivityRow>,
) -> Result<Proposal, String> {
    let name = ProposalName::new(&row.name).map_err(|err| format!("proposal {}: {err}", row.id))?;
    let color =
        ProposalColor::new(&row.color).map_err(|err| format!("proposal {}: {err}", row.id))?;
    let origin = ProposalOrigin::parse(&row.origin)
        .ok_or_else(|| format!("proposal {}: unknown origin {}", row.id, row.origin))?;
    let activities: Vec<ProposalActivity> =
        activities.into_iter().map(activity_from_row).collect();
    Ok(Proposal {
        id: ProposalId::from_uuid(row.id),
        trip_id: TripId::from_uuid(row.trip_id),
        name,
        color,
        origin,
        start_card_id: row.start_card_id.map(CardId::from_uuid),
        is_official: row.is_official,
        date: row.proposal_date,
        metrics: ProposalMetrics {
            total_budget: row.total_budget,
            activity_count: activities.len(),
            total_distance: row.total_distance,
        },
        activities,
    })
}

/// Group membership rows under their proposals, preserving proposal order.
fn assemble(
    rows: Vec<ProposalRow>,
    activity_rows: Vec<ProposalActivityRow>,
) -> Result<Vec<Proposal>, String> {
    let mut by_proposal: HashMap<Uuid, Vec<ProposalActivityRow>> = HashMap::new();
    for activity in activity_rows {
        by_proposal
            .entry(activity.proposal_id)
            .or_default()
            .push(activity);
    }
    rows.into_iter()
        .map(|row| {
            let activities = by_proposal.remove(&row.id).unwrap_or_default();
            proposal_from_rows(row, activities)
        })
        .collect()
}

async fn load_activity_rows(
    conn: &mut AsyncPgConnection,
    proposal_ids: &[Uuid],
) -> QueryResult<Vec<ProposalActivityRow>> {
    proposal_activities::table
        .filter(proposal_activities::proposal_id.eq_any(proposal_ids))
        .order((
            proposal_activities::proposal_id.asc(),
            proposal_activities::position.asc(),
        ))
        .select(ProposalActivityRow::as_select())
        .load(conn)
        .await
}

async fn load_by_ids(conn: &mut AsyncPgConnection, ids: &[Uuid]) -> Tx<Vec<Proposal>> {
    let rows: Vec<ProposalRow> = proposals::table
        .filter(proposals::id.eq_any(ids))
        .order(proposals::seq.asc())
        .select(ProposalRow::as_select())
        .load(conn)
        .await?;
    let activities = load_activity_rows(conn, ids).await?;
    assemble(rows, activities)
        .map_err(|message| TxError::Aborted(ProposalRepositoryError::query(message)))
}

async fn load_one(conn: &mut AsyncPgConnection, proposal_id: &ProposalId) -> Tx<Proposal> {
    load_by_ids(conn, &[*proposal_id.as_uuid()])
        .await?
        .pop()
        .ok_or_else(|| TxError::Aborted(ProposalRepositoryError::proposal_not_found(*proposal_id)))
}

async fn find_proposal_row(
    conn: &mut AsyncPgConnection,
    proposal_id: &ProposalId,
) -> Tx<ProposalRow> {
    proposals::table
        .find(proposal_id.as_uuid())
        .select(ProposalRow::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| TxError::Aborted(ProposalRepositoryError::proposal_not_found(*proposal_id)))
}

async fn insert_detected(conn: &mut AsyncPgConnection, detected: &DetectedProposal) -> Tx<()> {
    let id = *detected.id.as_uuid();
    diesel::insert_into(proposals::table)
        .values(NewProposalRow {
            id,
            trip_id: *detected.trip_id.as_uuid(),
            name: detected.name.as_ref(),
            color: detected.color.as_ref(),
            origin: ProposalOrigin::Detected.as_str(),
            start_card_id: Some(*detected.start_card_id.as_uuid()),
            activity_count: metric_count(detected.card_ids.len()),
        })
        .execute(conn)
        .await?;

    let memberships: Vec<NewProposalActivityRow> = detected
        .card_ids
        .iter()
        .zip(0..)
        .map(|(card_id, position)| NewProposalActivityRow {
            id: Uuid::new_v4(),
            proposal_id: id,
            card_id: *card_id.as_uuid(),
            day_number: None,
            position,
        })
        .collect();
    diesel::insert_into(proposal_activities::table)
        .values(&memberships)
        .execute(conn)
        .await?;

    let connection_ids: Vec<Uuid> = detected
        .connection_ids
        .iter()
        .map(|connection_id| *connection_id.as_uuid())
        .collect();
    // Connections claimed by a manual proposal keep their tag.
    diesel::update(
        canvas_connections::table
            .filter(canvas_connections::id.eq_any(&connection_ids))
            .filter(canvas_connections::proposal_id.is_null()),
    )
    .set(canvas_connections::proposal_id.eq(Some(id)))
    .execute(conn)
    .await?;
    Ok(())
}

/// Tag the untagged connections between `card_id` and the proposal's other
/// members.
async fn absorb_connections(
    conn: &mut AsyncPgConnection,
    proposal: &ProposalRow,
    card_id: Uuid,
) -> QueryResult<usize> {
    let members: Vec<Uuid> = proposal_activities::table
        .filter(proposal_activities::proposal_id.eq(proposal.id))
        .select(proposal_activities::card_id)
        .load(conn)
        .await?;
    diesel::update(
        canvas_connections::table
            .filter(canvas_connections::trip_id.eq(proposal.trip_id))
            .filter(canvas_connections::proposal_id.is_null())
            .filter(
                canvas_connections::source_card_id
                    .eq(card_id)
                    .and(canvas_connections::target_card_id.eq_any(&members))
                    .or(canvas_connections::target_card_id
                        .eq(card_id)
                        .and(canvas_connections::source_card_id.eq_any(&members))),
            ),
    )
    .set(canvas_connections::proposal_id.eq(Some(proposal.id)))
    .execute(conn)
    .await
}

/// Clear the proposal's tag from every connection touching `card_id`.
async fn release_connections(
    conn: &mut AsyncPgConnection,
    proposal_id: Uuid,
    card_id: Uuid,
) -> QueryResult<usize> {
    diesel::update(
        canvas_connections::table
            .filter(canvas_connections::proposal_id.eq(proposal_id))
            .filter(
                canvas_connections::source_card_id
                    .eq(card_id)
                    .or(canvas_connections::target_card_id.eq(card_id)),
            ),
    )
    .set(canvas_connections::proposal_id.eq(None::<Uuid>))
    .execute(conn)
    .await
}

#[async_trait]
impl ProposalRepository for DieselProposalRepository {
    async fn list_for_trip(
        &self,
        trip_id: &TripId,
    ) -> Result<Vec<Proposal>, ProposalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProposalRow> = proposals::table
            .filter(proposals::trip_id.eq(trip_id.as_uuid()))
            .order(proposals::seq.asc())
            .select(ProposalRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let activities = load_activity_rows(&mut conn, &ids)
            .await
            .map_err(map_diesel_error)?;
        assemble(rows, activities).map_err(ProposalRepositoryError::query)
    }

    async fn find_by_id(
        &self,
        proposal_id: &ProposalId,
    ) -> Result<Option<Proposal>, ProposalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids = [*proposal_id.as_uuid()];
        let found = load_by_ids(&mut conn, &ids)
            .await
            .map_err(|err| err.into_port_error(map_diesel_error))?;
        Ok(found.into_iter().next())
    }

    async fn create(&self, proposal: &NewProposal) -> Result<Proposal, ProposalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewProposalRow {
            id: *proposal.id.as_uuid(),
            trip_id: *proposal.trip_id.as_uuid(),
            name: proposal.name.as_ref(),
            color: proposal.color.as_ref(),
            origin: ProposalOrigin::Manual.as_str(),
            start_card_id: None,
            activity_count: 0,
        };
        let stored: ProposalRow = diesel::insert_into(proposals::table)
            .values(&row)
            .returning(ProposalRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match violation(&err) {
                Some(Violation::ForeignKey) => {
                    ProposalRepositoryError::trip_not_found(proposal.trip_id)
                }
                _ => map_diesel_error(err),
            })?;
        proposal_from_rows(stored, Vec::new()).map_err(ProposalRepositoryError::query)
    }

    async fn update(
        &self,
        proposal_id: &ProposalId,
        update: &ProposalUpdate,
    ) -> Result<Proposal, ProposalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = ProposalChangeset {
            name: update.name.as_ref().map(AsRef::as_ref),
            color: update.color.as_ref().map(AsRef::as_ref),
            proposal_date: update.date,
        };
        let id = *proposal_id;
        conn.transaction::<_, TxError<ProposalRepositoryError>, _>(|conn| {
            async move {
                let updated = diesel::update(proposals::table.find(id.as_uuid()))
                    .set(&changeset)
                    .execute(conn)
                    .await?;
                if updated == 0 {
                    return Err(TxError::Aborted(
                        ProposalRepositoryError::proposal_not_found(id),
                    ));
                }
                load_one(conn, &id).await
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(map_diesel_error))
    }

    async fn delete(&self, proposal_id: &ProposalId) -> Result<(), ProposalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(proposals::table.find(proposal_id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(ProposalRepositoryError::proposal_not_found(*proposal_id));
        }
        Ok(())
    }

    async fn replace_detected(
        &self,
        trip_id: &TripId,
        detected: &[DetectedProposal],
    ) -> Result<Vec<Proposal>, ProposalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let trip_id = *trip_id;
        conn.transaction::<_, TxError<ProposalRepositoryError>, _>(|conn| {
            async move {
                // Tagged connections fall back to NULL through the foreign key.
                diesel::delete(
                    proposals::table
                        .filter(proposals::trip_id.eq(trip_id.as_uuid()))
                        .filter(proposals::origin.eq(ProposalOrigin::Detected.as_str())),
                )
                .execute(conn)
                .await?;

                for proposal in detected {
                    insert_detected(conn, proposal).await?;
                }

                let ids: Vec<Uuid> = detected.iter().map(|p| *p.id.as_uuid()).collect();
                let mut stored = load_by_ids(conn, &ids).await?;
                let rank: HashMap<ProposalId, usize> = detected
                    .iter()
                    .enumerate()
                    .map(|(index, p)| (p.id, index))
                    .collect();
                stored.sort_by_key(|p| rank.get(&p.id).copied().unwrap_or(usize::MAX));
                Ok(stored)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(map_diesel_error))
    }

    async fn add_activity(
        &self,
        activity: &NewProposalActivity,
    ) -> Result<ProposalActivity, ProposalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let activity = activity.clone();
        let card_id = activity.card_id;
        conn.transaction::<_, TxError<ProposalRepositoryError>, _>(|conn| {
            async move {
                let proposal = find_proposal_row(conn, &activity.proposal_id).await?;
                let card_in_trip: bool = diesel::select(exists(
                    canvas_cards::table
                        .filter(canvas_cards::id.eq(activity.card_id.as_uuid()))
                        .filter(canvas_cards::trip_id.eq(proposal.trip_id)),
                ))
                .get_result(conn)
                .await?;
                if !card_in_trip {
                    return Err(TxError::Aborted(ProposalRepositoryError::card_not_found(
                        activity.card_id,
                    )));
                }

                let last_position: Option<i32> = proposal_activities::table
                    .filter(proposal_activities::proposal_id.eq(proposal.id))
                    .select(max(proposal_activities::position))
                    .get_result(conn)
                    .await?;
                let row: ProposalActivityRow = diesel::insert_into(proposal_activities::table)
                    .values(NewProposalActivityRow {
                        id: *activity.id.as_uuid(),
                        proposal_id: proposal.id,
                        card_id: *activity.card_id.as_uuid(),
                        day_number: activity.day_number,
                        position: last_position.map_or(0, |position| position + 1),
                    })
                    .returning(ProposalActivityRow::as_returning())
                    .get_result(conn)
                    .await?;
                absorb_connections(conn, &proposal, row.card_id).await?;
                Ok(activity_from_row(row))
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| match err {
            TxError::Diesel(error) if violation(&error) == Some(Violation::Unique) => {
                ProposalRepositoryError::duplicate_membership(card_id)
            }
            other => other.into_port_error(map_diesel_error),
        })
    }

    async fn remove_activity(
        &self,
        proposal_id: &ProposalId,
        card_id: &CardId,
    ) -> Result<(), ProposalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let proposal_id = *proposal_id.as_uuid();
        let card_id = *card_id;
        conn.transaction::<_, TxError<ProposalRepositoryError>, _>(|conn| {
            async move {
                let deleted = diesel::delete(
                    proposal_activities::table
                        .filter(proposal_activities::proposal_id.eq(proposal_id))
                        .filter(proposal_activities::card_id.eq(card_id.as_uuid())),
                )
                .execute(conn)
                .await?;
                if deleted == 0 {
                    return Err(TxError::Aborted(
                        ProposalRepositoryError::membership_not_found(card_id),
                    ));
                }
                release_connections(conn, proposal_id, *card_id.as_uuid()).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(map_diesel_error))
    }

    async fn assign_schedule(
        &self,
        proposal_id: &ProposalId,
        entries: &[ScheduleEntry],
    ) -> Result<(), ProposalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let proposal_id = *proposal_id;
        conn.transaction::<_, TxError<ProposalRepositoryError>, _>(|conn| {
            async move {
                find_proposal_row(conn, &proposal_id).await?;
                for entry in entries {
                    let updated = diesel::update(
                        proposal_activities::table
                            .filter(proposal_activities::proposal_id.eq(proposal_id.as_uuid()))
                            .filter(proposal_activities::card_id.eq(entry.card_id.as_uuid())),
                    )
                    .set((
                        proposal_activities::day_number.eq(Some(entry.day_number)),
                        proposal_activities::order_in_day.eq(Some(entry.order_in_day)),
                    ))
                    .execute(conn)
                    .await?;
                    if updated == 0 {
                        return Err(TxError::Aborted(ProposalRepositoryError::not_a_member(
                            entry.card_id,
                        )));
                    }
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(map_diesel_error))
    }

    async fn store_metrics(
        &self,
        metrics: &[(ProposalId, ProposalMetrics)],
    ) -> Result<(), ProposalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                for (proposal_id, values) in metrics {
                    diesel::update(proposals::table.find(proposal_id.as_uuid()))
                        .set((
                            proposals::total_budget.eq(values.total_budget),
                            proposals::activity_count.eq(metric_count(values.activity_count)),
                            proposals::total_distance.eq(values.total_distance),
                        ))
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn proposal_row() -> ProposalRow {
        ProposalRow {
            id: Uuid::new_v4(),
            trip_id: Uuid::new_v4(),
            name: "Proposal A".to_owned(),
            color: "#3B82F6".to_owned(),
            origin: "detected".to_owned(),
            start_card_id: Some(Uuid::new_v4()),
            is_official: false,
            proposal_date: None,
            total_budget: 4500.0,
            activity_count: 7,
            total_distance: 12.5,
        }
    }

    fn membership(proposal_id: Uuid, position: i32) -> ProposalActivityRow {
        ProposalActivityRow {
            id: Uuid::new_v4(),
            proposal_id,
            card_id: Uuid::new_v4(),
            day_number: None,
            order_in_day: None,
            position,
        }
    }

    #[rstest]
    fn activity_count_reflects_loaded_memberships(proposal_row: ProposalRow) {
        let id = proposal_row.id;
        let proposal = proposal_from_rows(proposal_row, vec![membership(id, 0), membership(id, 1)])
            .expect("valid row");

        assert_eq!(proposal.origin, ProposalOrigin::Detected);
        assert_eq!(proposal.metrics.activity_count, 2);
        assert_eq!(proposal.metrics.total_budget, 4500.0);
        assert_eq!(proposal.activities[1].position, 1);
    }

    #[rstest]
    #[case::origin("origin", "imported")]
    #[case::color("color", "blue")]
    #[case::name("name", "  ")]
    fn corrupt_rows_are_reported(
        mut proposal_row: ProposalRow,
        #[case] column: &str,
        #[case] value: &str,
    ) {
        match column {
            "origin" => proposal_row.origin = value.to_owned(),
            "color" => proposal_row.color = value.to_owned(),
            _ => proposal_row.name = value.to_owned(),
        }
        let id = proposal_row.id;
        let err = proposal_from_rows(proposal_row, Vec::new()).expect_err("corrupt row");
        assert!(err.contains(&id.to_string()));
    }

    #[rstest]
    fn assemble_groups_memberships_in_proposal_order() {
        let first = proposal_row();
        let second = proposal_row();
        let activities = vec![
            membership(second.id, 0),
            membership(first.id, 0),
            membership(second.id, 1),
        ];
        let (first_id, second_id) = (first.id, second.id);

        let proposals = assemble(vec![first, second], activities).expect("valid rows");

        assert_eq!(proposals[0].id, ProposalId::from_uuid(first_id));
        assert_eq!(proposals[0].activities.len(), 1);
        assert_eq!(proposals[1].id, ProposalId::from_uuid(second_id));
        assert_eq!(proposals[1].activities.len(), 2);
    }

    #[rstest]
    fn metric_counts_saturate() {
        assert_eq!(metric_count(3), 3);
        assert_eq!(metric_count(usize::MAX), i32::MAX);
    }
}
