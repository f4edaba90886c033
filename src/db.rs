use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use inner_orbit_analytics::{JournalRecord, LogKind, TimestampNormalizer};
use sqlx::{PgPool, Row};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn at(date: (i32, u32, u32), hour: u32, minute: u32) -> anyhow::Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .and_then(|day| day.and_hms_opt(hour, minute, 0))
        .context("invalid seed timestamp")
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let entries = vec![
        (
            "[Query]: 현재 감지되는 외부 인력의 강도는 어떠한가요?\n[Log]: 연락하고 싶은 충동이 강했다. 산책으로 버텼다.",
            25,
            85,
            at((2026, 1, 5), 1, 40)?,
            "DAILY",
        ),
        (
            "[Query]: 오늘 가장 잘 작동한 부분은 무엇인가요?\n[Log]: shipped the release, slept well",
            65,
            40,
            at((2026, 1, 7), 9, 15)?,
            "DAILY",
        ),
        (
            "Rain on the window, cold coffee, the hum of the office.",
            55,
            50,
            at((2026, 1, 9), 14, 5)?,
            "SENSORY",
        ),
        (
            "[Log]: deadline panic again\nskipped dinner, deadline moved",
            20,
            90,
            at((2026, 1, 12), 23, 50)?,
            "DAILY",
        ),
        (
            "Backpressure in queues maps to saying no to extra plans.",
            70,
            30,
            at((2026, 1, 14), 20, 10)?,
            "INSIGHT",
        ),
    ];

    let mut inserted = 0usize;
    for (content, stability, gravity, created_at, log_type) in entries {
        let result = sqlx::query(
            r#"
            INSERT INTO inner_orbit.log_entry (content, stability, gravity, created_at, log_type)
            SELECT $1, $2, $3, $4, $5
            WHERE NOT EXISTS (
                SELECT 1 FROM inner_orbit.log_entry WHERE created_at = $4 AND content = $1
            )
            "#,
        )
        .bind(content)
        .bind(stability)
        .bind(gravity)
        .bind(created_at)
        .bind(log_type)
        .execute(pool)
        .await?;
        inserted += result.rows_affected() as usize;
    }

    Ok(inserted)
}

pub async fn fetch_entries(
    pool: &PgPool,
    since_date: NaiveDate,
    kind: Option<LogKind>,
) -> anyhow::Result<Vec<JournalRecord>> {
    let mut query = String::from(
        "SELECT id, content, stability, gravity, created_at, log_type \
         FROM inner_orbit.log_entry \
         WHERE created_at >= $1",
    );

    if kind.is_some() {
        query.push_str(" AND log_type = $2");
    }
    query.push_str(" ORDER BY created_at, id");

    let since = since_date
        .and_hms_opt(0, 0, 0)
        .context("invalid cutoff date")?;
    let mut rows = sqlx::query(&query).bind(since);

    if let Some(value) = kind {
        rows = rows.bind(value.as_str());
    }

    let rows = rows.fetch_all(pool).await?;
    let mut entries = Vec::with_capacity(rows.len());

    for row in rows {
        let created_at: NaiveDateTime = row.get("created_at");
        let log_type: String = row.get("log_type");
        let id: i64 = row.get("id");
        let kind = log_type.parse().unwrap_or_else(|err| {
            tracing::warn!(id, %err, "unknown log type in storage, treating as daily");
            LogKind::Daily
        });

        entries.push(JournalRecord {
            id,
            timestamp: created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            content: row.get("content"),
            external_pull: row.get("gravity"),
            core_stability: row.get("stability"),
            kind,
        });
    }

    Ok(entries)
}

/// Merges records into storage by id. Existing ids are left untouched.
pub async fn import_records(
    pool: &PgPool,
    records: &[JournalRecord],
    normalizer: &TimestampNormalizer,
) -> anyhow::Result<usize> {
    let mut inserted = 0usize;
    let mut tx = pool.begin().await?;

    for record in records {
        let normalized = normalizer.normalize_record(record);
        if normalized.is_fallback() {
            tracing::warn!(id = record.id, "skipping entry with unreadable timestamp");
            continue;
        }

        let result = sqlx::query(
            r#"
            INSERT INTO inner_orbit.log_entry
            (id, content, stability, gravity, created_at, log_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(record.id)
        .bind(&record.content)
        .bind(record.stability())
        .bind(record.gravity())
        .bind(normalized.instant.naive_local())
        .bind(record.kind.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    sqlx::query(
        r#"
        SELECT setval(
            pg_get_serial_sequence('inner_orbit.log_entry', 'id'),
            GREATEST((SELECT COALESCE(MAX(id), 0) FROM inner_orbit.log_entry), 1)
        )
        "#,
    )
    .execute(&mut *tx)
    .await
    .context("failed to advance entry id sequence")?;

    tx.commit().await?;
    Ok(inserted)
}

pub fn cutoff_date(since_days: i64) -> NaiveDate {
    Utc::now().date_naive() - Duration::days(since_days.max(1))
}
