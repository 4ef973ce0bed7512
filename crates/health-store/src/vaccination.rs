//! Vaccination campaign storage.

use alert_engine::{parse_date, Location, VaccinationEvent};
use sqlx::{FromRow, SqlitePool};

use crate::coerce;
use crate::error::{conflict, Result, StoreError};

#[derive(Debug, FromRow)]
struct VaccinationRow {
    id: String,
    state: String,
    district: String,
    start_date: Option<String>,
    end_date: Option<String>,
    vaccine_name: String,
    target_population: String,
    doses_allocated: i64,
    doses_administered: i64,
    partner_org: String,
}

impl From<VaccinationRow> for VaccinationEvent {
    fn from(row: VaccinationRow) -> Self {
        VaccinationEvent {
            id: row.id,
            location: Location::new(&row.state, &row.district),
            start_date: row.start_date.as_deref().and_then(parse_date),
            end_date: row.end_date.as_deref().and_then(parse_date),
            vaccine_name: row.vaccine_name.trim().to_string(),
            target_population: row.target_population,
            doses_allocated: coerce::column_u64(row.doses_allocated),
            doses_administered: coerce::column_u64(row.doses_administered),
            partner_org: row.partner_org,
        }
    }
}

const SELECT_VACCINATION: &str = r#"
    SELECT id, state, district, start_date, end_date, vaccine_name,
           target_population, doses_allocated, doses_administered, partner_org
    FROM vaccinations
"#;

/// Store a new vaccination campaign.
pub async fn create_vaccination(pool: &SqlitePool, campaign: &VaccinationEvent) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO vaccinations (id, state, district, start_date, end_date, vaccine_name,
                                  target_population, doses_allocated, doses_administered,
                                  partner_org)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&campaign.id)
    .bind(&campaign.location.state)
    .bind(&campaign.location.district)
    .bind(campaign.start_date.map(|d| d.to_string()))
    .bind(campaign.end_date.map(|d| d.to_string()))
    .bind(&campaign.vaccine_name)
    .bind(&campaign.target_population)
    .bind(i64::try_from(campaign.doses_allocated).unwrap_or(i64::MAX))
    .bind(i64::try_from(campaign.doses_administered).unwrap_or(i64::MAX))
    .bind(&campaign.partner_org)
    .execute(pool)
    .await
    .map_err(|e| conflict("Vaccination", &campaign.id, e))?;

    Ok(())
}

/// List every vaccination campaign.
pub async fn list_vaccinations(pool: &SqlitePool) -> Result<Vec<VaccinationEvent>> {
    let query = format!("{SELECT_VACCINATION} ORDER BY id");
    let rows = sqlx::query_as::<_, VaccinationRow>(&query)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(VaccinationEvent::from).collect())
}

/// Delete a vaccination campaign by ID.
pub async fn delete_vaccination(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM vaccinations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound {
            entity: "Vaccination",
            id: id.to_string(),
        });
    }

    Ok(())
}
