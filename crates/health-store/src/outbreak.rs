//! Outbreak report storage.

use alert_engine::{parse_date, Location, OutbreakEvent, Severity};
use sqlx::{FromRow, SqlitePool};

use crate::coerce;
use crate::error::{conflict, Result, StoreError};

#[derive(Debug, FromRow)]
struct OutbreakRow {
    id: String,
    disease: String,
    report_date: Option<String>,
    state: String,
    district: String,
    cases_reported: i64,
    deaths: i64,
    severity: String,
    confirmed: bool,
    notes: String,
}

impl From<OutbreakRow> for OutbreakEvent {
    fn from(row: OutbreakRow) -> Self {
        OutbreakEvent {
            id: row.id,
            disease: row.disease.trim().to_string(),
            report_date: row.report_date.as_deref().and_then(parse_date),
            location: Location::new(&row.state, &row.district),
            cases_reported: coerce::column_u32(row.cases_reported),
            deaths: coerce::column_u32(row.deaths),
            severity: Severity::parse(&row.severity),
            confirmed: row.confirmed,
            notes: row.notes,
        }
    }
}

const SELECT_OUTBREAK: &str = r#"
    SELECT id, disease, report_date, state, district, cases_reported, deaths,
           severity, confirmed, notes
    FROM outbreaks
"#;

/// Store a new outbreak report.
pub async fn create_outbreak(pool: &SqlitePool, outbreak: &OutbreakEvent) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO outbreaks (id, disease, report_date, state, district,
                               cases_reported, deaths, severity, confirmed, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&outbreak.id)
    .bind(&outbreak.disease)
    .bind(outbreak.report_date.map(|d| d.to_string()))
    .bind(&outbreak.location.state)
    .bind(&outbreak.location.district)
    .bind(i64::from(outbreak.cases_reported))
    .bind(i64::from(outbreak.deaths))
    .bind(outbreak.severity.as_str())
    .bind(outbreak.confirmed)
    .bind(&outbreak.notes)
    .execute(pool)
    .await
    .map_err(|e| conflict("Outbreak", &outbreak.id, e))?;

    Ok(())
}

/// Get an outbreak report by ID.
pub async fn get_outbreak(pool: &SqlitePool, id: &str) -> Result<OutbreakEvent> {
    let query = format!("{SELECT_OUTBREAK} WHERE id = ?");
    sqlx::query_as::<_, OutbreakRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(OutbreakEvent::from)
        .ok_or_else(|| StoreError::NotFound {
            entity: "Outbreak",
            id: id.to_string(),
        })
}

/// List every outbreak report.
pub async fn list_outbreaks(pool: &SqlitePool) -> Result<Vec<OutbreakEvent>> {
    let query = format!("{SELECT_OUTBREAK} ORDER BY id");
    let rows = sqlx::query_as::<_, OutbreakRow>(&query)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(OutbreakEvent::from).collect())
}

/// Delete an outbreak report by ID.
pub async fn delete_outbreak(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM outbreaks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound {
            entity: "Outbreak",
            id: id.to_string(),
        });
    }

    Ok(())
}
