//! REST APIサーバー経由のストアゲートウェイ
//!
//! - `GET /bills` で一覧取得
//! - `POST /bills`（マルチパート）で領収書をアップロードし下書きを作成
//! - `PATCH /bills/{id}` で下書きを確定、下書きがない場合は `POST /bills`（JSON）

use super::models::{Bill, NewBill, ReceiptUpload, UploadedReceipt};
use super::store::BillsStore;
use crate::features::session::SessionContext;
use crate::shared::api_client::{ApiClient, MultipartFile};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use log::info;

const BILLS_ENDPOINT: &str = "/bills";

/// RESTストア
pub struct RestBillsStore {
    api_client: ApiClient,
    auth_token: Option<String>,
}

impl RestBillsStore {
    /// APIクライアントとセッションからストアを作成する
    pub fn new(api_client: ApiClient, session: &SessionContext) -> Self {
        Self {
            api_client,
            auth_token: session.token.clone(),
        }
    }

    fn token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }
}

/// 下書きを確定させるエンドポイント
fn bill_endpoint(id: &str) -> String {
    format!("{BILLS_ENDPOINT}/{id}")
}

#[async_trait]
impl BillsStore for RestBillsStore {
    async fn list(&self) -> AppResult<Vec<Bill>> {
        let bills: Vec<Bill> = self.api_client.get(BILLS_ENDPOINT, self.token()).await?;
        info!("請求書一覧取得成功: count={}", bills.len());
        Ok(bills)
    }

    async fn create(&self, bill: &NewBill) -> AppResult<Bill> {
        let created: Bill = match &bill.id {
            Some(id) => {
                if id.trim().is_empty() {
                    return Err(AppError::validation("下書きのキーが空です"));
                }
                self.api_client
                    .patch(&bill_endpoint(id), bill, self.token())
                    .await?
            }
            None => self.api_client.post(BILLS_ENDPOINT, bill, self.token()).await?,
        };

        info!("請求書作成成功: id={}", created.id);
        Ok(created)
    }

    async fn create_attachment(&self, upload: ReceiptUpload) -> AppResult<UploadedReceipt> {
        let fields = [("email", upload.email.clone().unwrap_or_default())];
        let file = MultipartFile {
            field_name: "file".to_string(),
            file_name: upload.file_name.clone(),
            content_type: upload.content_type,
            bytes: upload.bytes,
        };

        let mut uploaded: UploadedReceipt = self
            .api_client
            .post_multipart(BILLS_ENDPOINT, &file, &fields, self.token())
            .await?;

        // サーバーがファイル名を返さない場合は送信したファイル名を使う
        if uploaded.file_name.is_empty() {
            uploaded.file_name = upload.file_name;
        }

        info!(
            "領収書アップロード成功: key={}, url={}",
            uploaded.key, uploaded.file_url
        );
        Ok(uploaded)
    }
}
