//! Subscriber storage.

use alert_engine::{ChannelKind, Location, Subscriber};
use sqlx::{FromRow, SqlitePool};
use tracing::warn;

use crate::error::{conflict, Result, StoreError};

#[derive(Debug, FromRow)]
struct SubscriberRow {
    id: String,
    name: String,
    email: Option<String>,
    whatsapp: Option<String>,
    preferred_channel: String,
    state: String,
    district: String,
    notifications: bool,
}

impl From<SubscriberRow> for Subscriber {
    fn from(row: SubscriberRow) -> Self {
        let preferred_channel = row.preferred_channel.parse::<ChannelKind>().unwrap_or_else(|e| {
            warn!(subscriber = %row.id, error = %e, "Unknown channel, using email");
            ChannelKind::Email
        });
        Subscriber {
            id: row.id,
            name: row.name,
            email: row.email,
            whatsapp: row.whatsapp,
            preferred_channel,
            location: Location::new(&row.state, &row.district),
            notifications_enabled: row.notifications,
        }
    }
}

const SELECT_SUBSCRIBER: &str = r#"
    SELECT id, name, email, whatsapp, preferred_channel, state, district, notifications
    FROM users
"#;

/// Create a new subscriber.
pub async fn create_subscriber(pool: &SqlitePool, subscriber: &Subscriber) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, whatsapp, preferred_channel, state, district,
                           notifications)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&subscriber.id)
    .bind(&subscriber.name)
    .bind(&subscriber.email)
    .bind(&subscriber.whatsapp)
    .bind(subscriber.preferred_channel.as_str())
    .bind(&subscriber.location.state)
    .bind(&subscriber.location.district)
    .bind(subscriber.notifications_enabled)
    .execute(pool)
    .await
    .map_err(|e| conflict("Subscriber", &subscriber.id, e))?;

    Ok(())
}

/// Get a subscriber by ID.
pub async fn get_subscriber(pool: &SqlitePool, id: &str) -> Result<Subscriber> {
    let query = format!("{SELECT_SUBSCRIBER} WHERE id = ?");
    sqlx::query_as::<_, SubscriberRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(Subscriber::from)
        .ok_or_else(|| StoreError::NotFound {
            entity: "Subscriber",
            id: id.to_string(),
        })
}

/// Turn real-time notices on or off for a subscriber.
pub async fn set_notifications(pool: &SqlitePool, id: &str, enabled: bool) -> Result<()> {
    let result = sqlx::query("UPDATE users SET notifications = ? WHERE id = ?")
        .bind(enabled)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound {
            entity: "Subscriber",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List opted-in subscribers whose home location matches `location`.
///
/// Stored state and district values are normalized before matching, so rows
/// written by other tools with different casing still match.
pub async fn list_opted_in(pool: &SqlitePool, location: &Location) -> Result<Vec<Subscriber>> {
    let query = format!("{SELECT_SUBSCRIBER} WHERE notifications = 1 ORDER BY id");
    let rows = sqlx::query_as::<_, SubscriberRow>(&query)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(Subscriber::from)
        .filter(|s| location.matches(&s.location))
        .collect())
}
