//! Direct SQL seeding and inspection for rows the adapters under test do not
//! own: trips, canvas cards, connections and hand-entered itinerary rows.

use chrono::NaiveDate;
use postgres::{Client, NoTls};
use trip_canvas::domain::{CardId, ConnectionId, TripId};
use uuid::Uuid;

use super::format_postgres_error;

/// Synchronous `postgres` client bound to one test database.
pub struct Seeder {
    client: Client,
}

impl Seeder {
    pub fn connect(url: &str) -> Result<Self, String> {
        let client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
        Ok(Self { client })
    }

    pub fn trip(&mut self, start_date: NaiveDate) -> Result<TripId, String> {
        let trip_id = TripId::random();
        self.client
            .execute(
                "INSERT INTO trips (id, title, start_date) VALUES ($1, 'Kyoto', $2)",
                &[trip_id.as_uuid(), &start_date],
            )
            .map_err(|err| format_postgres_error(&err))?;
        Ok(trip_id)
    }

    pub fn card(&mut self, trip_id: &TripId, title: &str) -> Result<CardId, String> {
        let card_id = CardId::random();
        self.client
            .execute(
                concat!(
                    "INSERT INTO canvas_cards (id, trip_id, title, activity_type) ",
                    "VALUES ($1, $2, $3, 'sightseeing')"
                ),
                &[card_id.as_uuid(), trip_id.as_uuid(), &title],
            )
            .map_err(|err| format_postgres_error(&err))?;
        Ok(card_id)
    }

    pub fn connection(
        &mut self,
        trip_id: &TripId,
        source: &CardId,
        target: &CardId,
        distance_km: Option<f64>,
    ) -> Result<ConnectionId, String> {
        let connection_id = ConnectionId::random();
        self.client
            .execute(
                concat!(
                    "INSERT INTO canvas_connections ",
                    "(id, trip_id, source_card_id, target_card_id, distance_km) ",
                    "VALUES ($1, $2, $3, $4, $5)"
                ),
                &[
                    connection_id.as_uuid(),
                    trip_id.as_uuid(),
                    source.as_uuid(),
                    target.as_uuid(),
                    &distance_km,
                ],
            )
            .map_err(|err| format_postgres_error(&err))?;
        Ok(connection_id)
    }

    /// A manually entered itinerary row, not derived from any proposal.
    pub fn itinerary_activity(
        &mut self,
        trip_id: &TripId,
        day_number: i32,
        title: &str,
    ) -> Result<(), String> {
        self.client
            .execute(
                concat!(
                    "INSERT INTO itinerary_activities (id, trip_id, day_number, title, category) ",
                    "VALUES ($1, $2, $3, $4, 'other')"
                ),
                &[&Uuid::new_v4(), trip_id.as_uuid(), &day_number, &title],
            )
            .map_err(|err| format_postgres_error(&err))?;
        Ok(())
    }

    /// Itinerary titles of one day in `order_in_day`, then title, order.
    pub fn itinerary_titles(&mut self, trip_id: &TripId, day_number: i32) -> Vec<String> {
        self.client
            .query(
                concat!(
                    "SELECT title FROM itinerary_activities ",
                    "WHERE trip_id = $1 AND day_number = $2 ORDER BY order_in_day, title"
                ),
                &[trip_id.as_uuid(), &day_number],
            )
            .expect("itinerary query")
            .iter()
            .map(|row| row.get(0))
            .collect()
    }

    /// The proposal currently tagged on a connection.
    pub fn connection_tag(&mut self, connection_id: &ConnectionId) -> Option<Uuid> {
        self.client
            .query_one(
                "SELECT proposal_id FROM canvas_connections WHERE id = $1",
                &[connection_id.as_uuid()],
            )
            .expect("connection query")
            .get(0)
    }

    pub fn trip_status(&mut self, trip_id: &TripId) -> String {
        self.client
            .query_one("SELECT status FROM trips WHERE id = $1", &[trip_id.as_uuid()])
            .expect("trip query")
            .get(0)
    }
}
