//! Measurement rows, keyed by measurement identity
//!
//! An upsert is a full replace: every mutable column takes the new record's
//! value, including `NULL` for fields the new record lacks.

use crate::error::{IngestError, IngestResult};
use crate::models::{Measurement, SummaryStats, UnitType};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

/// Insert a measurement or overwrite the existing row with the same id
pub async fn upsert_measurement(conn: &mut SqliteConnection, measurement: &Measurement) -> IngestResult<()> {
    let (freq_min, freq_max, freq_count) = split_stats(measurement.freq_stats);
    let (spl_min, spl_max, spl_count) = split_stats(measurement.spl_stats);

    sqlx::query(
        r#"
        INSERT INTO measurement (
            id, title, unit_type, unit_number, smoothing, start_freq, end_freq,
            ppo, freq_step, rew_version, notes, measured_at,
            freq_min, freq_max, freq_count, spl_min, spl_max, spl_count
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            unit_type = excluded.unit_type,
            unit_number = excluded.unit_number,
            smoothing = excluded.smoothing,
            start_freq = excluded.start_freq,
            end_freq = excluded.end_freq,
            ppo = excluded.ppo,
            freq_step = excluded.freq_step,
            rew_version = excluded.rew_version,
            notes = excluded.notes,
            measured_at = excluded.measured_at,
            freq_min = excluded.freq_min,
            freq_max = excluded.freq_max,
            freq_count = excluded.freq_count,
            spl_min = excluded.spl_min,
            spl_max = excluded.spl_max,
            spl_count = excluded.spl_count
        "#,
    )
    .bind(measurement.id.to_string())
    .bind(&measurement.title)
    .bind(measurement.unit_type.map(UnitType::code))
    .bind(measurement.unit_number)
    .bind(&measurement.smoothing)
    .bind(measurement.start_freq)
    .bind(measurement.end_freq)
    .bind(measurement.ppo)
    .bind(measurement.freq_step)
    .bind(&measurement.rew_version)
    .bind(&measurement.notes)
    .bind(measurement.measured_at)
    .bind(freq_min)
    .bind(freq_max)
    .bind(freq_count)
    .bind(spl_min)
    .bind(spl_max)
    .bind(spl_count)
    .execute(&mut *conn)
    .await?;

    tracing::debug!(id = %measurement.id, title = %measurement.title, "Measurement upserted");
    Ok(())
}

/// Measurement by id
pub async fn load_measurement(conn: &mut SqliteConnection, id: Uuid) -> IngestResult<Option<Measurement>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, unit_type, unit_number, smoothing, start_freq, end_freq,
               ppo, freq_step, rew_version, notes, measured_at,
               freq_min, freq_max, freq_count, spl_min, spl_max, spl_count
        FROM measurement WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(measurement_from_row).transpose()
}

pub async fn count_measurements(conn: &mut SqliteConnection) -> IngestResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM measurement")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

fn split_stats(stats: Option<SummaryStats>) -> (Option<f64>, Option<f64>, Option<i64>) {
    match stats {
        Some(s) => (Some(s.min), Some(s.max), Some(s.count)),
        None => (None, None, None),
    }
}

fn join_stats(min: Option<f64>, max: Option<f64>, count: Option<i64>) -> Option<SummaryStats> {
    Some(SummaryStats {
        min: min?,
        max: max?,
        count: count?,
    })
}

fn measurement_from_row(row: &SqliteRow) -> IngestResult<Measurement> {
    let id: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| IngestError::Internal(format!("invalid measurement id {:?} in catalog: {}", id, e)))?;
    let unit_type: Option<String> = row.try_get("unit_type")?;

    Ok(Measurement {
        id,
        title: row.try_get("title")?,
        unit_type: unit_type.as_deref().map(UnitType::from_code).transpose()?,
        unit_number: row.try_get("unit_number")?,
        smoothing: row.try_get("smoothing")?,
        start_freq: row.try_get("start_freq")?,
        end_freq: row.try_get("end_freq")?,
        ppo: row.try_get("ppo")?,
        freq_step: row.try_get("freq_step")?,
        rew_version: row.try_get("rew_version")?,
        notes: row.try_get("notes")?,
        measured_at: row.try_get("measured_at")?,
        freq_stats: join_stats(row.try_get("freq_min")?, row.try_get("freq_max")?, row.try_get("freq_count")?),
        spl_stats: join_stats(row.try_get("spl_min")?, row.try_get("spl_max")?, row.try_get("spl_count")?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sweepdb_common::db::{init_in_memory_catalog, sync_catalog_schema};

    fn full_record(id: Uuid) -> Measurement {
        let mut m = Measurement::new(id, "Bass Shaker 3");
        m.unit_type = Some(UnitType::BassShaker);
        m.unit_number = Some(3);
        m.smoothing = Some("1/24".to_string());
        m.start_freq = Some(2.0);
        m.end_freq = Some(24_000.0);
        m.ppo = Some(48.0);
        m.rew_version = Some("5.31".to_string());
        m.notes = Some("first pass".to_string());
        m.measured_at = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap().and_hms_opt(8, 30, 0);
        m.freq_stats = SummaryStats::from_values(&[20.0, 40.0]);
        m.spl_stats = SummaryStats::from_values(&[70.5, 72.0]);
        m
    }

    #[tokio::test]
    async fn test_round_trip() {
        let pool = init_in_memory_catalog().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        sync_catalog_schema(&mut conn).await.unwrap();

        let m = full_record(Uuid::new_v4());
        upsert_measurement(&mut conn, &m).await.unwrap();

        assert_eq!(load_measurement(&mut conn, m.id).await.unwrap(), Some(m));
        assert_eq!(load_measurement(&mut conn, Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upsert_is_full_replace() {
        let pool = init_in_memory_catalog().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        sync_catalog_schema(&mut conn).await.unwrap();

        let id = Uuid::new_v4();
        upsert_measurement(&mut conn, &full_record(id)).await.unwrap();

        let sparse = Measurement::new(id, "renamed");
        upsert_measurement(&mut conn, &sparse).await.unwrap();

        assert_eq!(count_measurements(&mut conn).await.unwrap(), 1);
        assert_eq!(load_measurement(&mut conn, id).await.unwrap(), Some(sparse));
    }
}
