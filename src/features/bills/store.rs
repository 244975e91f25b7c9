use super::models::{Bill, NewBill, ReceiptUpload, UploadedReceipt};
use crate::shared::errors::AppResult;
use async_trait::async_trait;

/// `bills` リソースに対するストアゲートウェイ
///
/// 失敗はHTTPステータス付きの `AppError::Status`、または接続エラーとして返る。
#[async_trait]
pub trait BillsStore: Send + Sync {
    /// 請求書の一覧を取得する
    async fn list(&self) -> AppResult<Vec<Bill>>;

    /// 請求書を作成する
    ///
    /// `bill.id` がある場合は、領収書アップロード時に作られた下書きを確定させる。
    async fn create(&self, bill: &NewBill) -> AppResult<Bill>;

    /// 領収書ファイルをアップロードし、下書きレコードを作成する
    async fn create_attachment(&self, upload: ReceiptUpload) -> AppResult<UploadedReceipt>;
}
