use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Utc};

/// アップロード先キーの書式
const REMOTE_KEY_FORMAT: &str = "/data/%Y%m%d_%H%M%S.jpg";

/// この年より前の時刻は SNTP 未同期とみなす
const MIN_SYNCED_YEAR: i32 = 2024;

/// 壁時計が同期済みと思われるか（起動直後は 1970 年から始まる）
pub fn is_clock_synced(utc: &DateTime<Utc>) -> bool {
    utc.year() >= MIN_SYNCED_YEAR
}

/// UTC時刻を固定オフセットのローカル時刻に変換する
pub fn local_datetime(utc: DateTime<Utc>, utc_offset_seconds: i32) -> NaiveDateTime {
    match FixedOffset::east_opt(utc_offset_seconds) {
        Some(offset) => utc.with_timezone(&offset).naive_local(),
        None => utc.naive_utc(),
    }
}

/// ローカル時刻から `/data/YYYYMMDD_HHMMSS.jpg` 形式のキーを作る
pub fn remote_object_key(local_time: &NaiveDateTime) -> String {
    local_time.format(REMOTE_KEY_FORMAT).to_string()
}

/// バケット内のオブジェクト名（先頭の `/` を除いたキー）
pub fn object_name_for_key(remote_key: &str) -> &str {
    remote_key.trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_remote_key_format() {
        let local = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(13, 45, 2)
            .unwrap();
        assert_eq!(remote_object_key(&local), "/data/20240501_134502.jpg");
    }

    #[test]
    fn test_local_datetime_applies_negative_offset() {
        let utc = Utc.with_ymd_and_hms(2024, 5, 1, 16, 45, 2).unwrap();
        let local = local_datetime(utc, -3 * 3_600);
        assert_eq!(remote_object_key(&local), "/data/20240501_134502.jpg");
    }

    #[test]
    fn test_local_datetime_crosses_midnight() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
        let local = local_datetime(utc, -3 * 3_600);
        assert_eq!(remote_object_key(&local), "/data/20231231_220000.jpg");
    }

    #[test]
    fn test_unsynced_clock_is_detected() {
        assert!(!is_clock_synced(&DateTime::<Utc>::UNIX_EPOCH));
        assert!(is_clock_synced(&Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_object_name_strips_leading_slash() {
        assert_eq!(object_name_for_key("/data/20240501_134502.jpg"), "data/20240501_134502.jpg");
        assert_eq!(object_name_for_key("data/x.jpg"), "data/x.jpg");
    }
}
