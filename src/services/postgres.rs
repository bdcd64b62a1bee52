use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;

use crate::models::{
    Booking, BookingStatus, CatalogFilter, DateRange, PastBooking, Property, PropertyStatus,
    RawPreference, SearchLogEntry, TravelProfile, UserPreference, UserSignalBundle,
};

use super::accessors::{AccessorError, BookingAccessor, CatalogAccessor, SignalAccessor};

/// Property projection shared by every query joining `properties p`.
/// Money columns may be NUMERIC in the schema, so they are cast to float8.
const PROPERTY_COLUMNS: &str = r#"
    p.id::text AS id, p.title, p.property_type::text AS property_type,
    p.status::text AS status, p.city, p.country,
    p.amenities, p.max_guests, p.min_nights, p.max_nights,
    p.base_price::float8 AS base_price, p.cleaning_fee::float8 AS cleaning_fee,
    p.currency, p.rating::float8 AS rating, p.review_count, p.deleted_at, p.created_at
"#;

/// How much history is loaded per user
#[derive(Debug, Clone, Copy)]
pub struct HistoryLimits {
    pub bookings: i64,
    pub searches: i64,
    pub saved_properties: i64,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            bookings: 10,
            searches: 20,
            saved_properties: 50,
        }
    }
}

/// PostgreSQL-backed catalog, calendar and signal accessor
///
/// The schema belongs to the booking platform; this client only reads it.
pub struct PostgresClient {
    pool: PgPool,
    history: HistoryLimits,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, AccessorError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self {
            pool,
            history: HistoryLimits::default(),
        })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, AccessorError> {
        tracing::info!("Connecting to PostgreSQL at {}", redact_credentials(url));

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    pub fn with_history_limits(mut self, history: HistoryLimits) -> Self {
        self.history = history;
        self
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, AccessorError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }

    async fn user_exists(&self, user_id: &str) -> Result<bool, AccessorError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE id::text = $1) AS present")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("present")?)
    }

    async fn load_preferences(&self, user_id: &str) -> Result<Vec<UserPreference>, AccessorError> {
        let query = r#"
            SELECT preference_type, preference_value, weight::int8 AS weight
            FROM user_preferences
            WHERE user_id::text = $1
            ORDER BY weight DESC NULLS LAST
        "#;

        let rows = sqlx::query(query).bind(user_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<UserPreference, AccessorError> {
                let raw = RawPreference {
                    preference_type: row.try_get("preference_type")?,
                    preference_value: row
                        .try_get::<Option<serde_json::Value>, _>("preference_value")?
                        .unwrap_or(serde_json::Value::Null),
                    weight: row.try_get("weight")?,
                };
                Ok(UserPreference::from(raw))
            })
            .collect()
    }

    async fn load_travel_profile(&self, user_id: &str) -> Result<Option<TravelProfile>, AccessorError> {
        let query = r#"
            SELECT name, preferred_property_types, must_have_amenities, nice_to_have_amenities,
                   budget_min::float8 AS budget_min, budget_max::float8 AS budget_max
            FROM travel_profiles
            WHERE user_id::text = $1 AND is_default = true
            ORDER BY updated_at DESC
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> Result<TravelProfile, AccessorError> {
            Ok(TravelProfile {
                name: row.try_get::<Option<String>, _>("name")?.unwrap_or_default(),
                preferred_property_types: text_array(&row, "preferred_property_types")?,
                must_have_amenities: text_array(&row, "must_have_amenities")?,
                nice_to_have_amenities: text_array(&row, "nice_to_have_amenities")?,
                budget_min: row.try_get("budget_min")?,
                budget_max: row.try_get("budget_max")?,
            })
        })
        .transpose()
    }

    async fn load_saved_properties(&self, user_id: &str) -> Result<Vec<Property>, AccessorError> {
        let query = format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM saved_properties s
            JOIN properties p ON p.id = s.property_id
            WHERE s.user_id::text = $1
            ORDER BY s.created_at DESC
            LIMIT $2
            "#
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .bind(self.history.saved_properties)
            .fetch_all(&self.pool)
            .await?;

        // Saved listings may have been unpublished since; the scorer still learns from them
        Ok(rows.iter().filter_map(decode_or_skip).collect())
    }

    async fn load_recent_bookings(&self, user_id: &str) -> Result<Vec<PastBooking>, AccessorError> {
        let query = r#"
            SELECT b.property_id::text AS property_id, p.property_type::text AS property_type, p.city,
                   b.check_in::date AS check_in, b.check_out::date AS check_out
            FROM bookings b
            JOIN properties p ON p.id = b.property_id
            WHERE b.user_id::text = $1 AND lower(b.status::text) = 'completed'
            ORDER BY b.check_out DESC
            LIMIT $2
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .bind(self.history.bookings)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<PastBooking, AccessorError> {
                Ok(PastBooking {
                    property_id: row.try_get("property_id")?,
                    property_type: row.try_get("property_type")?,
                    city: row.try_get("city")?,
                    check_in: row.try_get("check_in")?,
                    check_out: row.try_get("check_out")?,
                })
            })
            .collect()
    }

    async fn load_recent_searches(&self, user_id: &str) -> Result<Vec<SearchLogEntry>, AccessorError> {
        let query = r#"
            SELECT criteria, created_at
            FROM search_logs
            WHERE user_id::text = $1
            ORDER BY created_at DESC
            LIMIT $2
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .bind(self.history.searches)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<SearchLogEntry, AccessorError> {
                Ok(SearchLogEntry {
                    criteria: row
                        .try_get::<Option<serde_json::Value>, _>("criteria")?
                        .unwrap_or(serde_json::Value::Null),
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl CatalogAccessor for PostgresClient {
    async fn get_property(&self, property_id: &str) -> Result<Option<Property>, AccessorError> {
        let query = format!("SELECT {PROPERTY_COLUMNS} FROM properties p WHERE p.id::text = $1");

        let row = sqlx::query(&query)
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(property_from_row).transpose()
    }

    async fn find_candidates(&self, filter: &CatalogFilter) -> Result<Vec<Property>, AccessorError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties p \
             WHERE lower(p.status::text) = 'active' AND p.deleted_at IS NULL"
        ));

        if !filter.property_types.is_empty() {
            builder.push(" AND lower(p.property_type::text) = ANY(");
            builder.push_bind(lowercased(&filter.property_types));
            builder.push(")");
        }

        if !filter.cities.is_empty() {
            builder.push(" AND lower(p.city) = ANY(");
            builder.push_bind(lowercased(&filter.cities));
            builder.push(")");
        }

        if let Some(min_price) = filter.min_price {
            builder.push(" AND p.base_price >= ");
            builder.push_bind(min_price);
        }

        if let Some(max_price) = filter.max_price {
            builder.push(" AND p.base_price <= ");
            builder.push_bind(max_price);
        }

        if !filter.amenities.is_empty() {
            builder.push(" AND ARRAY(SELECT lower(a) FROM unnest(p.amenities) a) @> ");
            builder.push_bind(lowercased(&filter.amenities));
        }

        builder.push(" ORDER BY p.rating DESC NULLS LAST, p.created_at DESC LIMIT ");
        builder.push_bind(filter.limit as i64);

        let rows = builder.build().fetch_all(&self.pool).await?;
        let candidates: Vec<Property> = rows.iter().filter_map(decode_or_skip).collect();

        tracing::debug!(
            "Catalog returned {} candidates for filter {:?}",
            candidates.len(),
            filter
        );

        Ok(candidates)
    }
}

#[async_trait]
impl BookingAccessor for PostgresClient {
    async fn find_blocked_dates(
        &self,
        property_id: &str,
        range: DateRange,
    ) -> Result<Vec<NaiveDate>, AccessorError> {
        let query = r#"
            SELECT date::date AS date
            FROM property_availability
            WHERE property_id::text = $1
              AND date::date >= $2
              AND date::date < $3
              AND is_available = false
            ORDER BY date
        "#;

        let rows = sqlx::query(query)
            .bind(property_id)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get("date").map_err(Into::into))
            .collect()
    }

    async fn find_overlapping_bookings(
        &self,
        property_id: &str,
        range: DateRange,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>, AccessorError> {
        let query = r#"
            SELECT id::text AS id, property_id::text AS property_id,
                   check_in::date AS check_in, check_out::date AS check_out, status::text AS status
            FROM bookings
            WHERE property_id::text = $1
              AND lower(status::text) = ANY($2)
              AND check_in::date < $4
              AND check_out::date > $3
        "#;

        let status_names: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();

        let rows = sqlx::query(query)
            .bind(property_id)
            .bind(status_names)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.pool)
            .await?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in &rows {
            let raw_status: String = row.try_get("status")?;
            let Some(status) = BookingStatus::parse(&raw_status) else {
                tracing::warn!("Skipping booking with unknown status {}", raw_status);
                continue;
            };
            bookings.push(Booking {
                id: row.try_get("id")?,
                property_id: row.try_get("property_id")?,
                check_in: row.try_get("check_in")?,
                check_out: row.try_get("check_out")?,
                status,
            });
        }

        Ok(bookings)
    }
}

#[async_trait]
impl SignalAccessor for PostgresClient {
    async fn load_signals(&self, user_id: &str) -> Result<Option<UserSignalBundle>, AccessorError> {
        if !self.user_exists(user_id).await? {
            return Ok(None);
        }

        let (preferences, travel_profile, saved_properties, recent_bookings, recent_searches) = tokio::try_join!(
            self.load_preferences(user_id),
            self.load_travel_profile(user_id),
            self.load_saved_properties(user_id),
            self.load_recent_bookings(user_id),
            self.load_recent_searches(user_id),
        )?;

        tracing::debug!(
            "Loaded signals for {}: {} preferences, profile={}, {} saved, {} bookings, {} searches",
            user_id,
            preferences.len(),
            travel_profile.is_some(),
            saved_properties.len(),
            recent_bookings.len(),
            recent_searches.len()
        );

        Ok(Some(UserSignalBundle {
            user_id: user_id.to_string(),
            preferences,
            travel_profile,
            saved_properties,
            recent_bookings,
            recent_searches,
        }))
    }
}

fn property_from_row(row: &PgRow) -> Result<Property, AccessorError> {
    let status: String = row.try_get("status")?;

    Ok(Property {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        property_type: row.try_get("property_type")?,
        status: PropertyStatus::parse(&status),
        city: row.try_get("city")?,
        country: row.try_get("country")?,
        amenities: text_array(row, "amenities")?,
        max_guests: non_negative(row.try_get("max_guests")?, "max_guests")?,
        min_nights: row
            .try_get::<Option<i32>, _>("min_nights")?
            .map(|n| non_negative(n, "min_nights"))
            .transpose()?
            .unwrap_or(1),
        max_nights: row
            .try_get::<Option<i32>, _>("max_nights")?
            .map(|n| non_negative(n, "max_nights"))
            .transpose()?,
        base_price: row.try_get("base_price")?,
        cleaning_fee: row.try_get("cleaning_fee")?,
        currency: row
            .try_get::<Option<String>, _>("currency")?
            .unwrap_or_else(|| "USD".to_string()),
        rating: row.try_get("rating")?,
        review_count: row
            .try_get::<Option<i32>, _>("review_count")?
            .map(|n| non_negative(n, "review_count"))
            .transpose()?
            .unwrap_or(0),
        deleted_at: row.try_get("deleted_at")?,
        created_at: row.try_get("created_at")?,
    })
}

fn decode_or_skip(row: &PgRow) -> Option<Property> {
    match property_from_row(row) {
        Ok(property) => Some(property),
        Err(e) => {
            tracing::warn!("Skipping malformed property row: {}", e);
            None
        }
    }
}

fn text_array(row: &PgRow, column: &str) -> Result<Vec<String>, AccessorError> {
    Ok(row
        .try_get::<Option<Vec<String>>, _>(column)?
        .unwrap_or_default())
}

fn non_negative(value: i32, column: &str) -> Result<u32, AccessorError> {
    u32::try_from(value)
        .map_err(|_| AccessorError::InvalidData(format!("{} is negative: {}", column, value)))
}

fn lowercased(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_lowercase()).collect()
}

/// Strip the password from a connection URL before logging it
fn redact_credentials(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..])
        }
        _ => url.to_string(),
    }
}
