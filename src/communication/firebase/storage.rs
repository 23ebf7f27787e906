use chrono::NaiveDateTime;
use log::{error, info, warn};
use serde::Deserialize;

use super::{parse_error_reason, percent_encode, FirebaseSession};
use crate::communication::http::{HttpRequest, HttpTransport, TransportError};
use crate::communication::NetworkLink;
use crate::core::domain_logic::{object_name_for_key, remote_object_key};
use crate::storage::PhotoStore;

const STORAGE_BASE_URL: &str = "https://firebasestorage.googleapis.com/v0/b";

/// アップロードする画像の MIME タイプ
pub const PHOTO_CONTENT_TYPE: &str = "image/jpeg";

/// アップロード結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { download_url: String },
    Failed { reason: String },
}

/// 1サイクル分のアップロード結果（ログ出力のみ、保存しない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub remote_path: String,
    pub outcome: UploadOutcome,
}

impl UploadResult {
    pub fn is_uploaded(&self) -> bool {
        matches!(self.outcome, UploadOutcome::Uploaded { .. })
    }
}

#[derive(Debug, thiserror::Error)]
enum UploadError {
    #[error("写真ファイルを読み出せません: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{reason}")]
    Rejected { status: u16, reason: String },
    #[error("アップロードのレスポンスを解析できません: {0}")]
    InvalidResponse(String),
}

/// Storage のオブジェクトメタデータ（必要な項目のみ）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    download_tokens: Option<String>,
}

/// オブジェクト名を URL 用にエンコードする (`data/x.jpg` → `data%2Fx.jpg`)
pub fn encode_object_name(object_name: &str) -> String {
    percent_encode(object_name)
}

/// アップロード先 URL
pub fn upload_url(bucket: &str, object_name: &str) -> String {
    format!(
        "{}/{}/o?name={}",
        STORAGE_BASE_URL,
        bucket,
        encode_object_name(object_name)
    )
}

/// ダウンロード URL（トークンが複数ある場合は先頭を使う）
pub fn download_url(bucket: &str, object_name: &str, download_tokens: Option<&str>) -> String {
    let base = format!(
        "{}/{}/o/{}?alt=media",
        STORAGE_BASE_URL,
        bucket,
        encode_object_name(object_name)
    );
    match download_tokens
        .and_then(|tokens| tokens.split(',').next())
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        Some(token) => format!("{}&token={}", base, token),
        None => base,
    }
}

/// 最後に撮影した写真を Firebase Storage へ送る
///
/// リトライもキューイングも行わない。失敗は理由をログに出して終わる。
pub struct UploadDispatcher<T: HttpTransport> {
    transport: T,
    link: Box<dyn NetworkLink>,
    session: FirebaseSession,
    bucket: String,
}

impl<T: HttpTransport> UploadDispatcher<T> {
    pub fn new(
        transport: T,
        link: Box<dyn NetworkLink>,
        session: FirebaseSession,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            link,
            session,
            bucket: bucket.into(),
        }
    }

    pub fn session(&self) -> &FirebaseSession {
        &self.session
    }

    /// 起動時の初回サインイン
    pub fn prepare(&mut self, uptime_ms: u64) -> bool {
        self.session.ready(&mut self.transport, uptime_ms)
    }

    /// 保存済みの写真を `/data/YYYYMMDD_HHMMSS.jpg` としてアップロードする
    ///
    /// 接続またはセッションの準備ができていなければ何もせず `None` を返す。
    pub fn upload_last_capture<S: PhotoStore + ?Sized>(
        &mut self,
        store: &S,
        uptime_ms: u64,
        local_time: &NaiveDateTime,
    ) -> Option<UploadResult> {
        if !self.link.is_connected() {
            warn!("WiFiが切断されています。再接続を試みます");
            if !self.link.reconnect() {
                warn!("WiFiに再接続できませんでした。アップロードをスキップします");
                return None;
            }
        }

        if !self.session.ready(&mut self.transport, uptime_ms) {
            warn!("Firebase の準備ができていません。アップロードをスキップします");
            return None;
        }

        let remote_path = remote_object_key(local_time);
        info!("写真をアップロード中... {}", remote_path);

        let outcome = match self.upload_file(store, object_name_for_key(&remote_path)) {
            Ok(download_url) => {
                info!("Download URL: {}", download_url);
                UploadOutcome::Uploaded { download_url }
            }
            Err(e) => {
                if let UploadError::Rejected { status: 401 | 403, .. } = e {
                    self.session.invalidate();
                }
                let reason = e.to_string();
                error!("アップロードに失敗しました: {}", reason);
                UploadOutcome::Failed { reason }
            }
        };

        Some(UploadResult {
            remote_path,
            outcome,
        })
    }

    fn upload_file<S: PhotoStore + ?Sized>(
        &mut self,
        store: &S,
        object_name: &str,
    ) -> Result<String, UploadError> {
        let id_token = self
            .session
            .id_token()
            .ok_or_else(|| UploadError::InvalidResponse("IDトークンがありません".to_string()))?;

        let size = store.photo_size()?;
        let mut reader = store.open_photo()?;

        let request = HttpRequest::new(upload_url(&self.bucket, object_name))
            .with_header("Authorization", format!("Firebase {}", id_token))
            .with_header("Content-Type", PHOTO_CONTENT_TYPE);
        let response = self.transport.post(&request, &mut reader, size)?;

        if !response.is_success() {
            return Err(UploadError::Rejected {
                status: response.status,
                reason: parse_error_reason(&response),
            });
        }

        let metadata: ObjectMetadata = serde_json::from_slice(&response.body)
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
        Ok(download_url(
            &self.bucket,
            &metadata.name,
            metadata.download_tokens.as_deref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::firebase::FirebaseCredentials;
    use crate::communication::mock::{MockHttpTransport, MockNetworkLink};
    use crate::storage::mock::MemoryPhotoStore;
    use chrono::NaiveDate;

    const SIGN_IN_OK: &str = r#"{"idToken":"id-1","refreshToken":"r-1","expiresIn":"3600"}"#;
    const UPLOAD_OK: &str = r#"{"name":"data/20240501_134502.jpg","bucket":"box.appspot.com","contentType":"image/jpeg","downloadTokens":"tok-1,tok-2"}"#;

    fn local_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(13, 45, 2)
            .unwrap()
    }

    fn dispatcher(
        transport: &MockHttpTransport,
        link: &MockNetworkLink,
    ) -> UploadDispatcher<MockHttpTransport> {
        let session = FirebaseSession::new(FirebaseCredentials {
            api_key: "key".to_string(),
            email: "box@example.com".to_string(),
            password: "pw".to_string(),
        });
        UploadDispatcher::new(transport.clone(), Box::new(link.clone()), session, "box.appspot.com")
    }

    fn stored_photo() -> MemoryPhotoStore {
        let mut store = MemoryPhotoStore::new();
        store.write_photo(&[0xAB; 300]).unwrap();
        store
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            upload_url("box.appspot.com", "data/20240501_134502.jpg"),
            "https://firebasestorage.googleapis.com/v0/b/box.appspot.com/o?name=data%2F20240501_134502.jpg"
        );
        assert_eq!(
            download_url("box.appspot.com", "data/a.jpg", Some("t1,t2")),
            "https://firebasestorage.googleapis.com/v0/b/box.appspot.com/o/data%2Fa.jpg?alt=media&token=t1"
        );
        assert_eq!(
            download_url("box.appspot.com", "data/a.jpg", None),
            "https://firebasestorage.googleapis.com/v0/b/box.appspot.com/o/data%2Fa.jpg?alt=media"
        );
    }

    #[test]
    fn test_successful_upload() {
        let transport = MockHttpTransport::new();
        let link = MockNetworkLink::new(true);
        transport.queue_response(200, SIGN_IN_OK);
        transport.queue_response(200, UPLOAD_OK);
        let mut dispatcher = dispatcher(&transport, &link);

        let result = dispatcher
            .upload_last_capture(&stored_photo(), 0, &local_time())
            .unwrap();

        assert_eq!(result.remote_path, "/data/20240501_134502.jpg");
        assert_eq!(
            result.outcome,
            UploadOutcome::Uploaded {
                download_url: "https://firebasestorage.googleapis.com/v0/b/box.appspot.com/o/data%2F20240501_134502.jpg?alt=media&token=tok-1".to_string()
            }
        );

        let upload = &transport.requests()[1];
        assert_eq!(upload.request.header("Authorization"), Some("Firebase id-1"));
        assert_eq!(upload.request.header("Content-Type"), Some("image/jpeg"));
        assert_eq!(upload.content_length, 300);
        assert_eq!(upload.body, vec![0xAB; 300]);
    }

    #[test]
    fn test_rejected_upload_reports_reason_and_drops_token() {
        let transport = MockHttpTransport::new();
        let link = MockNetworkLink::new(true);
        transport.queue_response(200, SIGN_IN_OK);
        transport.queue_response(403, r#"{"error":{"code":403,"message":"Permission denied."}}"#);
        let mut dispatcher = dispatcher(&transport, &link);

        let result = dispatcher
            .upload_last_capture(&stored_photo(), 0, &local_time())
            .unwrap();

        assert_eq!(
            result.outcome,
            UploadOutcome::Failed {
                reason: "Permission denied.".to_string()
            }
        );
        assert!(!result.is_uploaded());
        assert_eq!(dispatcher.session().id_token(), None);
    }

    #[test]
    fn test_server_error_keeps_token() {
        let transport = MockHttpTransport::new();
        let link = MockNetworkLink::new(true);
        transport.queue_response(200, SIGN_IN_OK);
        transport.queue_response(503, "");
        let mut dispatcher = dispatcher(&transport, &link);

        let result = dispatcher
            .upload_last_capture(&stored_photo(), 0, &local_time())
            .unwrap();

        assert_eq!(
            result.outcome,
            UploadOutcome::Failed {
                reason: "HTTP 503".to_string()
            }
        );
        assert_eq!(dispatcher.session().id_token(), Some("id-1"));
    }

    #[test]
    fn test_not_ready_skips_upload() {
        let transport = MockHttpTransport::new();
        let link = MockNetworkLink::new(true);
        transport.queue_response(400, r#"{"error":{"code":400,"message":"INVALID_PASSWORD"}}"#);
        let mut dispatcher = dispatcher(&transport, &link);

        assert_eq!(
            dispatcher.upload_last_capture(&stored_photo(), 0, &local_time()),
            None
        );
        assert_eq!(transport.count_requests_to("firebasestorage"), 0);
    }

    #[test]
    fn test_disconnected_link_is_reconnected_first() {
        let transport = MockHttpTransport::new();
        let link = MockNetworkLink::new(false);
        transport.queue_response(200, SIGN_IN_OK);
        transport.queue_response(200, UPLOAD_OK);
        let mut dispatcher = dispatcher(&transport, &link);

        let result = dispatcher.upload_last_capture(&stored_photo(), 0, &local_time());

        assert!(result.unwrap().is_uploaded());
        assert_eq!(link.reconnect_count(), 1);
    }

    #[test]
    fn test_failed_reconnect_skips_upload() {
        let transport = MockHttpTransport::new();
        let link = MockNetworkLink::new(false);
        link.set_reconnect_succeeds(false);
        let mut dispatcher = dispatcher(&transport, &link);

        assert_eq!(
            dispatcher.upload_last_capture(&stored_photo(), 0, &local_time()),
            None
        );
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_missing_photo_is_a_failure() {
        let transport = MockHttpTransport::new();
        let link = MockNetworkLink::new(true);
        transport.queue_response(200, SIGN_IN_OK);
        let mut dispatcher = dispatcher(&transport, &link);

        let result = dispatcher
            .upload_last_capture(&MemoryPhotoStore::new(), 0, &local_time())
            .unwrap();

        match result.outcome {
            UploadOutcome::Failed { reason } => assert!(reason.contains("写真ファイルを読み出せません")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
