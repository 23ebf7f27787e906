/// UTCオフセットの時間部分の上限
const MAX_UTC_OFFSET_HOURS: u32 = 23;

/// デバウンス時間の上限（ミリ秒）
pub const MAX_DEBOUNCE_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingWifiSsid,
    MissingApiKey,
    MissingUserEmail,
    MissingStorageBucket,
    InvalidDebounceMs(u64),
    InvalidMinPhotoSize(u64),
    InvalidUtcOffset(String),
    MissingNtpServer,
}

pub fn validate_wifi_ssid(ssid: &str) -> Result<(), ValidationError> {
    if ssid.is_empty() {
        Err(ValidationError::MissingWifiSsid)
    } else {
        Ok(())
    }
}

pub fn validate_firebase_credentials(api_key: &str, user_email: &str) -> Result<(), ValidationError> {
    if api_key.is_empty() {
        return Err(ValidationError::MissingApiKey);
    }
    if user_email.is_empty() {
        return Err(ValidationError::MissingUserEmail);
    }
    Ok(())
}

/// バケットIDは `gs://` 付きでも受け付け、プレフィックスを除いて返す
pub fn parse_storage_bucket(bucket: &str) -> Result<String, ValidationError> {
    let trimmed = bucket.trim().trim_start_matches("gs://").trim_end_matches('/');
    if trimmed.is_empty() {
        Err(ValidationError::MissingStorageBucket)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn parse_debounce_ms(value: u64) -> Result<u64, ValidationError> {
    if value > MAX_DEBOUNCE_MS {
        Err(ValidationError::InvalidDebounceMs(value))
    } else {
        Ok(value)
    }
}

pub fn parse_min_photo_size(value: u64) -> Result<u64, ValidationError> {
    if value == 0 {
        Err(ValidationError::InvalidMinPhotoSize(value))
    } else {
        Ok(value)
    }
}

/// `"-03:00"` / `"+09:00"` / `"-3"` 形式のUTCオフセットを秒に変換する
pub fn parse_utc_offset(value: &str) -> Result<i32, ValidationError> {
    let invalid = || ValidationError::InvalidUtcOffset(value.to_string());
    let trimmed = value.trim();

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        Some(_) => (1, trimmed),
        None => return Err(invalid()),
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };
    // 符号は先頭の1文字のみ。"--03:00" のような二重符号は受け付けない
    let hours = parse_digits(hours).ok_or_else(invalid)?;
    let minutes = parse_digits(minutes).ok_or_else(invalid)?;
    if hours > MAX_UTC_OFFSET_HOURS || minutes >= 60 {
        return Err(invalid());
    }

    // 23:59 以内なので i32 に収まる
    let seconds = sign * (hours * 3_600 + minutes * 60) as i32;
    Ok(seconds)
}

fn parse_digits(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// 0 は「無制限」を意味する
pub fn parse_attempt_limit(value: u32) -> Option<u32> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}

/// 空文字のホストを除外し、最低1台残っていることを確認する
pub fn parse_ntp_servers(primary: &str, secondary: &str) -> Result<Vec<String>, ValidationError> {
    let servers: Vec<String> = [primary, secondary]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if servers.is_empty() {
        Err(ValidationError::MissingNtpServer)
    } else {
        Ok(servers)
    }
}
