use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{decode_revenues, encode_revenues, ForecastFilter, ForecastMetadata, ForecastRecord};

const FORECAST_COLUMNS: &str = "id, start_year, forecast_data, timestamp, system_size, \
     location, battery_chemistry, use_case, premium";

// Raw row as stored; enums and the revenue list are kept as text.
#[derive(Debug, Clone, FromRow)]
pub struct ForecastRow {
    pub id: Uuid,
    pub start_year: i32,
    pub forecast_data: String,
    pub timestamp: DateTime<Utc>,
    pub system_size: f64,
    pub location: String,
    pub battery_chemistry: String,
    pub use_case: String,
    pub premium: bool,
}

impl TryFrom<ForecastRow> for ForecastRecord {
    type Error = String;

    fn try_from(row: ForecastRow) -> Result<Self, Self::Error> {
        Ok(ForecastRecord {
            id: row.id,
            start_year: row.start_year,
            revenues: decode_revenues(&row.forecast_data)?,
            metadata: ForecastMetadata {
                system_size: row.system_size,
                location: row.location.parse()?,
                battery_chemistry: row.battery_chemistry.parse()?,
                use_case: row.use_case.parse()?,
                premium: row.premium,
            },
            submitted_at: row.timestamp,
        })
    }
}

pub async fn create_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS forecasts (
            id UUID PRIMARY KEY,
            start_year INTEGER NOT NULL,
            forecast_data TEXT NOT NULL,
            timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            system_size DOUBLE PRECISION NOT NULL,
            location TEXT NOT NULL,
            battery_chemistry TEXT NOT NULL,
            use_case TEXT NOT NULL,
            premium BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert(pool: &PgPool, record: &ForecastRecord) -> Result<ForecastRow, sqlx::Error> {
    let sql = format!(
        "INSERT INTO forecasts ({FORECAST_COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {FORECAST_COLUMNS}"
    );

    sqlx::query_as::<_, ForecastRow>(&sql)
        .bind(record.id)
        .bind(record.start_year)
        .bind(encode_revenues(&record.revenues))
        .bind(record.submitted_at)
        .bind(record.metadata.system_size)
        .bind(record.metadata.location.as_str())
        .bind(record.metadata.battery_chemistry.as_str())
        .bind(record.metadata.use_case.as_str())
        .bind(record.metadata.premium)
        .fetch_one(pool)
        .await
}

pub async fn fetch_filtered(
    pool: &PgPool,
    filter: &ForecastFilter,
) -> Result<Vec<ForecastRow>, sqlx::Error> {
    let mut query_builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {FORECAST_COLUMNS} FROM forecasts WHERE 1=1"));

    if let Some(location) = filter.location {
        query_builder.push(" AND location = ");
        query_builder.push_bind(location.as_str());
    }
    if let Some(chemistry) = filter.battery_chemistry {
        query_builder.push(" AND battery_chemistry = ");
        query_builder.push_bind(chemistry.as_str());
    }
    if let Some(use_case) = filter.use_case {
        query_builder.push(" AND use_case = ");
        query_builder.push_bind(use_case.as_str());
    }
    if let Some(premium) = filter.premium {
        query_builder.push(" AND premium = ");
        query_builder.push_bind(premium);
    }
    if let Some(min) = filter.min_system_size {
        query_builder.push(" AND system_size >= ");
        query_builder.push_bind(min);
    }
    if let Some(max) = filter.max_system_size {
        query_builder.push(" AND system_size <= ");
        query_builder.push_bind(max);
    }
    query_builder.push(" ORDER BY timestamp DESC");

    query_builder
        .build_query_as::<ForecastRow>()
        .fetch_all(pool)
        .await
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM forecasts")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
