//! Daily Counter Repository
//!
//! Crash-safe per-day numbering for receipts and takeaway queues.
//! Single-statement upserts, so concurrent callers never observe the
//! same value twice.

use chrono::NaiveDate;
use rand::Rng;

use super::RepoResult;
use sqlx::SqlitePool;

/// Receipt numbers look like REC2026082500042: compact date prefix
/// plus a 5-digit daily sequence starting at 1.
pub async fn next_receipt_number(pool: &SqlitePool, date: NaiveDate) -> RepoResult<String> {
    let day = date.format("%Y%m%d").to_string();
    let count = next_order_count(pool, &day).await?;
    Ok(format!("REC{day}{count:05}"))
}

async fn next_order_count(pool: &SqlitePool, day: &str) -> RepoResult<i64> {
    // First use of a day seeds the queue counter at a random offset
    // so call numbers are not guessable across days
    let start: i64 = rand::thread_rng().gen_range(0..1000);
    let count = sqlx::query_scalar::<_, i64>(
        "INSERT INTO daily_counter (day, order_count, queue_number) VALUES (?1, 1, ?2) \
         ON CONFLICT(day) DO UPDATE SET order_count = order_count + 1 \
         RETURNING order_count",
    )
    .bind(day)
    .bind(start)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Next takeaway pickup number for the day, wrapping at 1000
pub async fn next_queue_number(pool: &SqlitePool, date: NaiveDate) -> RepoResult<i64> {
    let day = date.format("%Y%m%d").to_string();
    let start: i64 = rand::thread_rng().gen_range(0..1000);
    let n = sqlx::query_scalar::<_, i64>(
        "INSERT INTO daily_counter (day, order_count, queue_number) VALUES (?1, 0, (?2 + 1) % 1000) \
         ON CONFLICT(day) DO UPDATE SET queue_number = (queue_number + 1) % 1000 \
         RETURNING queue_number",
    )
    .bind(&day)
    .bind(start)
    .fetch_one(pool)
    .await?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE daily_counter (
                day TEXT PRIMARY KEY,
                order_count INTEGER NOT NULL DEFAULT 0,
                queue_number INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_receipt_numbers_increment() {
        let pool = test_pool().await;
        let d = day(2026, 8, 25);
        assert_eq!(next_receipt_number(&pool, d).await.unwrap(), "REC2026082500001");
        assert_eq!(next_receipt_number(&pool, d).await.unwrap(), "REC2026082500002");
        assert_eq!(next_receipt_number(&pool, d).await.unwrap(), "REC2026082500003");
    }

    #[tokio::test]
    async fn test_receipt_sequence_resets_per_day() {
        let pool = test_pool().await;
        next_receipt_number(&pool, day(2026, 8, 25)).await.unwrap();
        next_receipt_number(&pool, day(2026, 8, 25)).await.unwrap();
        // New day starts from 1 again
        assert_eq!(
            next_receipt_number(&pool, day(2026, 8, 26)).await.unwrap(),
            "REC2026082600001"
        );
    }

    #[tokio::test]
    async fn test_queue_numbers_increment_and_stay_in_range() {
        let pool = test_pool().await;
        let d = day(2026, 8, 25);
        let first = next_queue_number(&pool, d).await.unwrap();
        let second = next_queue_number(&pool, d).await.unwrap();
        assert!((0..1000).contains(&first));
        assert_eq!(second, (first + 1) % 1000);
    }

    #[tokio::test]
    async fn test_queue_number_wraps_at_1000() {
        let pool = test_pool().await;
        let d = day(2026, 8, 25);
        next_queue_number(&pool, d).await.unwrap();
        sqlx::query("UPDATE daily_counter SET queue_number = 999")
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(next_queue_number(&pool, d).await.unwrap(), 0);
    }
}
