//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Columns the proposal
//! core never reads (audit timestamps, trip titles) are still declared so
//! `diesel print-schema` output and this file stay diffable.

diesel::table! {
    /// Trips owned by the trip CRUD layer; read here for start date and
    /// status.
    trips (id) {
        id -> Uuid,
        title -> Varchar,
        start_date -> Nullable<Date>,
        end_date -> Nullable<Date>,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Activity cards placed on a trip's canvas.
    canvas_cards (id) {
        id -> Uuid,
        trip_id -> Uuid,
        position_x -> Float8,
        position_y -> Float8,
        title -> Varchar,
        activity_type -> Varchar,
        location -> Nullable<Varchar>,
        custom_location -> Nullable<Jsonb>,
        start_time -> Nullable<Time>,
        end_time -> Nullable<Time>,
        cost -> Nullable<Float8>,
        budget_category -> Nullable<Varchar>,
        memo -> Nullable<Text>,
        participants -> Array<Uuid>,
        is_completed -> Bool,
        is_collapsed -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed connections between cards, optionally tagged with the
    /// proposal that absorbed them.
    canvas_connections (id) {
        id -> Uuid,
        trip_id -> Uuid,
        source_card_id -> Uuid,
        target_card_id -> Uuid,
        transport_mode -> Nullable<Varchar>,
        duration_minutes -> Nullable<Int4>,
        distance_km -> Nullable<Float8>,
        cost -> Nullable<Float8>,
        route -> Nullable<Jsonb>,
        proposal_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Detected and manual proposals with cached metrics.
    proposals (id) {
        id -> Uuid,
        trip_id -> Uuid,
        name -> Varchar,
        color -> Varchar,
        /// `detected` or `manual`.
        origin -> Varchar,
        start_card_id -> Nullable<Uuid>,
        is_official -> Bool,
        proposal_date -> Nullable<Date>,
        total_budget -> Float8,
        activity_count -> Int4,
        total_distance -> Float8,
        created_at -> Timestamptz,
        /// Insertion order; detected proposals share `created_at`.
        seq -> Int8,
    }
}

diesel::table! {
    /// Card memberships of proposals, unique per `(proposal_id, card_id)`.
    proposal_activities (id) {
        id -> Uuid,
        proposal_id -> Uuid,
        card_id -> Uuid,
        day_number -> Nullable<Int4>,
        order_in_day -> Nullable<Int4>,
        position -> Int4,
    }
}

diesel::table! {
    /// Canonical day-by-day itinerary activities.
    itinerary_activities (id) {
        id -> Uuid,
        trip_id -> Uuid,
        day_number -> Int4,
        order_in_day -> Int4,
        title -> Varchar,
        category -> Varchar,
        location -> Nullable<Varchar>,
        start_at -> Nullable<Timestamp>,
        end_at -> Nullable<Timestamp>,
        cost -> Nullable<Float8>,
        budget_category -> Nullable<Varchar>,
        memo -> Nullable<Text>,
        is_completed -> Bool,
        source_card_id -> Nullable<Uuid>,
        from_canvas -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Participants attached to itinerary activities.
    activity_participants (activity_id, participant_id) {
        activity_id -> Uuid,
        participant_id -> Uuid,
    }
}

diesel::table! {
    /// Transport legs attached to the itinerary activity they arrive at.
    transport_legs (id) {
        id -> Uuid,
        activity_id -> Uuid,
        source_connection_id -> Nullable<Uuid>,
        mode -> Varchar,
        duration_minutes -> Nullable<Int4>,
        distance_km -> Nullable<Float8>,
        cost -> Nullable<Float8>,
        route -> Nullable<Jsonb>,
        is_auto_derived -> Bool,
    }
}

diesel::joinable!(canvas_cards -> trips (trip_id));
diesel::joinable!(proposals -> trips (trip_id));
diesel::joinable!(proposal_activities -> proposals (proposal_id));
diesel::joinable!(proposal_activities -> canvas_cards (card_id));
diesel::joinable!(itinerary_activities -> trips (trip_id));
diesel::joinable!(activity_participants -> itinerary_activities (activity_id));
diesel::joinable!(transport_legs -> itinerary_activities (activity_id));

diesel::allow_tables_to_appear_in_same_query!(
    trips,
    canvas_cards,
    canvas_connections,
    proposals,
    proposal_activities,
    itinerary_activities,
    activity_participants,
    transport_legs,
);
