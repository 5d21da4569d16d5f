//! PostgreSQL implementation of the persistence layer.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use super::models::{EventKey, FreshnessRecord};
use super::EventStore;
use crate::domain::{Artist, CanonicalEvent, EventSource, Venue};
use crate::error::GatewayError;

/// PostgreSQL-backed event store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of the `events` table. Venue and artist data live in JSONB
/// columns since they are read and written as whole sub-objects.
#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: i64,
    source: String,
    link: Option<String>,
    name: Option<String>,
    ages: Option<String>,
    festival_flag: bool,
    livestream_flag: bool,
    electronic_genre_flag: bool,
    other_genre_flag: bool,
    date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    created_date: DateTime<Utc>,
    venue: Option<Json<Venue>>,
    artist_list: Json<Vec<Artist>>,
    location_id: i64,
}

impl TryFrom<EventRow> for CanonicalEvent {
    type Error = GatewayError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let source = EventSource::parse(&row.source).ok_or_else(|| {
            GatewayError::PersistenceError(format!("unknown source tag: {}", row.source))
        })?;
        Ok(Self {
            id: row.id,
            source,
            link: row.link,
            name: row.name,
            ages: row.ages,
            festival_flag: row.festival_flag,
            livestream_flag: row.livestream_flag,
            electronic_genre_flag: row.electronic_genre_flag,
            other_genre_flag: row.other_genre_flag,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            created_date: row.created_date,
            venue: row.venue.map(|Json(v)| v),
            artist_list: row.artist_list.0,
            location_id: row.location_id,
        })
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn events_for_location(
        &self,
        location_id: i64,
    ) -> Result<Vec<CanonicalEvent>, GatewayError> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT id, source, link, name, ages, festival_flag, livestream_flag, \
             electronic_genre_flag, other_genre_flag, date, start_time, end_time, \
             created_date, venue, artist_list, location_id \
             FROM events WHERE location_id = $1 ORDER BY date ASC",
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        rows.into_iter().map(CanonicalEvent::try_from).collect()
    }

    async fn event_keys_for_ids(&self, ids: &[i64]) -> Result<Vec<EventKey>, GatewayError> {
        let rows = sqlx::query_as::<_, (i64, String, i64)>(
            "SELECT id, source, location_id FROM events WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        rows.into_iter()
            .map(|(id, source, location_id)| {
                let source = EventSource::parse(&source).ok_or_else(|| {
                    GatewayError::PersistenceError(format!("unknown source tag: {source}"))
                })?;
                Ok(EventKey {
                    id,
                    source,
                    location_id,
                })
            })
            .collect()
    }

    async fn upsert_events(&self, events: &[CanonicalEvent]) -> Result<u64, GatewayError> {
        let mut written = 0;
        for event in events {
            let result = sqlx::query(
                "INSERT INTO events (id, source, link, name, ages, festival_flag, \
                 livestream_flag, electronic_genre_flag, other_genre_flag, date, \
                 start_time, end_time, created_date, venue, artist_list, location_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
                 ON CONFLICT (id) DO UPDATE SET \
                 source = EXCLUDED.source, link = EXCLUDED.link, name = EXCLUDED.name, \
                 ages = EXCLUDED.ages, festival_flag = EXCLUDED.festival_flag, \
                 livestream_flag = EXCLUDED.livestream_flag, \
                 electronic_genre_flag = EXCLUDED.electronic_genre_flag, \
                 other_genre_flag = EXCLUDED.other_genre_flag, date = EXCLUDED.date, \
                 start_time = EXCLUDED.start_time, end_time = EXCLUDED.end_time, \
                 created_date = EXCLUDED.created_date, venue = EXCLUDED.venue, \
                 artist_list = EXCLUDED.artist_list, location_id = EXCLUDED.location_id",
            )
            .bind(event.id)
            .bind(event.source.as_str())
            .bind(event.link.as_deref())
            .bind(event.name.as_deref())
            .bind(event.ages.as_deref())
            .bind(event.festival_flag)
            .bind(event.livestream_flag)
            .bind(event.electronic_genre_flag)
            .bind(event.other_genre_flag)
            .bind(event.date)
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(event.created_date)
            .bind(event.venue.as_ref().map(Json))
            .bind(Json(&event.artist_list))
            .bind(event.location_id)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
            written += result.rows_affected();
        }
        Ok(written)
    }

    async fn delete_events_by_source(
        &self,
        location_id: i64,
        source: EventSource,
    ) -> Result<u64, GatewayError> {
        let result = sqlx::query("DELETE FROM events WHERE location_id = $1 AND source = $2")
            .bind(location_id)
            .bind(source.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn delete_past_events(&self, cutoff: NaiveDate) -> Result<u64, GatewayError> {
        let result = sqlx::query("DELETE FROM events WHERE date < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn freshness_for_location(
        &self,
        location_id: i64,
    ) -> Result<Option<FreshnessRecord>, GatewayError> {
        let row = sqlx::query_as::<_, (i64, DateTime<Utc>, DateTime<Utc>)>(
            "SELECT location_id, last_update, next_update FROM cache_control \
             WHERE location_id = $1",
        )
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(row.map(|(location_id, last_update, next_update)| FreshnessRecord {
            location_id,
            last_update,
            next_update,
        }))
    }

    async fn insert_freshness(&self, record: &FreshnessRecord) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO cache_control (location_id, last_update, next_update) \
             VALUES ($1, $2, $3) ON CONFLICT (location_id) DO NOTHING",
        )
        .bind(record.location_id)
        .bind(record.last_update)
        .bind(record.next_update)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    async fn upsert_freshness(&self, record: &FreshnessRecord) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO cache_control (location_id, last_update, next_update) \
             VALUES ($1, $2, $3) ON CONFLICT (location_id) DO UPDATE SET \
             last_update = EXCLUDED.last_update, next_update = EXCLUDED.next_update",
        )
        .bind(record.location_id)
        .bind(record.last_update)
        .bind(record.next_update)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(())
    }
}
