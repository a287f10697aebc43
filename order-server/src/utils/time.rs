//! 时间工具函数 — 业务时区转换
//!
//! 所有日期→时间戳转换统一在这里完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::NaiveDate;
use chrono_tz::Tz;

/// 当前业务日 (业务时区的今天)
pub fn business_today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// 日期 + 时分秒 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn date_hms_to_millis(date: NaiveDate, hour: u32, min: u32, sec: u32, tz: Tz) -> i64 {
    let naive = match date.and_hms_opt(hour, min, sec) {
        Some(n) => n,
        None => date.and_hms_opt(0, 0, 0).unwrap_or_default(),
    };
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_hms_to_millis(date, 0, 0, 0, tz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_start_is_midnight_in_tz() {
        let tz: Tz = "Europe/Madrid".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        // Madrid is UTC+1 in January, so local midnight = 23:00 UTC previous day
        let millis = day_start_millis(date, tz);
        let utc = chrono::DateTime::from_timestamp_millis(millis).unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-01-14T23:00:00+00:00");
    }

    #[test]
    fn test_day_start_orders_monotonic() {
        let tz: Tz = "Europe/Madrid".parse().unwrap();
        let d1 = NaiveDate::from_ymd_opt(2026, 3, 28).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap();
        assert!(day_start_millis(d1, tz) < day_start_millis(d2, tz));
    }
}
