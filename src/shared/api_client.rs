//! 汎用APIクライアント
//!
//! ストアゲートウェイのREST実装が使うHTTPクライアント。
//! 2xx以外のレスポンスはHTTPステータス付きの `AppError::Status` に変換する。

use crate::shared::config::environment::ApiConfig;
use crate::shared::errors::AppError;
use log::{debug, info, warn};
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// APIサーバーからのエラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// マルチパートで送るファイル
#[derive(Debug, Clone)]
pub struct MultipartFile {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// 汎用APIクライアント
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// 環境設定からAPIクライアントを作成
    pub fn new() -> Result<Self, AppError> {
        Self::new_with_config(ApiConfig::from_env())
    }

    /// 設定を指定してAPIクライアントを作成
    pub fn new_with_config(config: ApiConfig) -> Result<Self, AppError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// 設定を取得
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(request: RequestBuilder, auth_token: Option<&str>) -> RequestBuilder {
        match auth_token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str, auth_token: Option<&str>) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        info!("GETリクエスト送信: endpoint={endpoint}");

        let request = Self::authorize(self.client.get(self.url(endpoint)), auth_token);
        self.send_request_with_retry(request, "GET", endpoint).await
    }

    /// POSTリクエストを送信（JSONボディ）
    pub async fn post<B, T>(
        &self,
        endpoint: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> Result<T, AppError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("POSTリクエスト送信: endpoint={endpoint}");

        let request = Self::authorize(self.client.post(self.url(endpoint)).json(body), auth_token);
        self.send_request_with_retry(request, "POST", endpoint)
            .await
    }

    /// PATCHリクエストを送信（JSONボディ）
    pub async fn patch<B, T>(
        &self,
        endpoint: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> Result<T, AppError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("PATCHリクエスト送信: endpoint={endpoint}");

        let request =
            Self::authorize(self.client.patch(self.url(endpoint)).json(body), auth_token);
        self.send_request_with_retry(request, "PATCH", endpoint)
            .await
    }

    /// マルチパートのPOSTリクエストを送信
    ///
    /// Content-Typeは境界文字列付きでreqwestが設定する。
    pub async fn post_multipart<T>(
        &self,
        endpoint: &str,
        file: &MultipartFile,
        fields: &[(&str, String)],
        auth_token: Option<&str>,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        info!(
            "マルチパートPOSTリクエスト送信: endpoint={endpoint}, file={}",
            file.file_name
        );

        let url = self.url(endpoint);

        // リトライ機能付きでリクエスト送信
        let mut attempts = 0;
        loop {
            // マルチパートフォームデータを構築（リトライごとに再作成）
            let part = multipart::Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(|e| AppError::validation(format!("MIMEタイプ設定エラー: {e}")))?;

            let mut form = multipart::Form::new().part(file.field_name.clone(), part);
            for (name, value) in fields {
                form = form.text(name.to_string(), value.clone());
            }

            let request = Self::authorize(self.client.post(&url).multipart(form), auth_token);

            match request.send().await {
                Ok(response) => return self.parse_response(response, "POST", endpoint).await,
                Err(e) => {
                    // 送信済みの可能性があるタイムアウトなどは再送しない
                    if should_retry(&e) && attempts < self.config.max_retries {
                        attempts += 1;
                        let delay = Duration::from_secs(2_u64.pow(attempts));
                        warn!(
                            "APIリクエスト失敗、リトライします: attempt={attempts}/{}, delay={delay:?}",
                            self.config.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(AppError::ExternalService(format!(
                        "APIサーバーへの接続に失敗しました: {e}"
                    )));
                }
            }
        }
    }

    /// リトライ機能付きでリクエストを送信
    ///
    /// 接続エラーのみリトライし、タイムアウトやHTTPエラーはそのまま返す。
    async fn send_request_with_retry<T>(
        &self,
        request: RequestBuilder,
        method: &str,
        endpoint: &str,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let mut attempts = 0;
        loop {
            let Some(cloned_request) = request.try_clone() else {
                return Err(AppError::ExternalService(
                    "リクエストのクローンに失敗しました".to_string(),
                ));
            };

            match cloned_request.send().await {
                Ok(response) => return self.parse_response(response, method, endpoint).await,
                Err(e) => {
                    // 送信済みの可能性があるタイムアウトなどは再送しない
                    if should_retry(&e) && attempts < self.config.max_retries {
                        attempts += 1;
                        let delay = Duration::from_secs(2_u64.pow(attempts));
                        warn!(
                            "APIリクエスト失敗、リトライします: attempt={attempts}/{}, delay={delay:?}",
                            self.config.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(AppError::ExternalService(format!(
                        "APIサーバーへの接続に失敗しました: {e}"
                    )));
                }
            }
        }
    }

    async fn parse_response<T>(
        &self,
        response: Response,
        method: &str,
        endpoint: &str,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        if response.status().is_success() {
            let result: T = response
                .json()
                .await
                .map_err(|e| AppError::ExternalService(format!("レスポンス解析エラー: {e}")))?;

            info!("{method}リクエスト成功: endpoint={endpoint}");
            return Ok(result);
        }

        let status = response.status().as_u16();
        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| "レスポンス読み取り失敗".to_string());

        Err(status_error(status, &response_text))
    }
}

/// 接続確立前に失敗したリクエストのみリトライ対象とする
fn should_retry(error: &reqwest::Error) -> bool {
    error.is_connect()
}

/// エラーレスポンスをステータス付きエラーに変換する
///
/// 構造化エラーレスポンスであればそのメッセージを使い、そうでなければ本文をそのまま使う。
pub fn status_error(status: u16, response_text: &str) -> AppError {
    let message = match serde_json::from_str::<ErrorResponse>(response_text) {
        Ok(error_response) => {
            debug!(
                "APIサーバーから構造化エラーレスポンスを受信: code={}, message={}",
                error_response.error.code, error_response.error.message
            );
            format!(
                "{} - {}",
                error_response.error.code, error_response.error.message
            )
        }
        Err(_) => {
            warn!(
                "APIサーバーから非構造化エラーレスポンス: status={status}, body={response_text}"
            );
            response_text.to_string()
        }
    };

    AppError::with_status(status, message)
}
