//! プロセス内メモリで動作するストアゲートウェイ
//!
//! オフライン動作とテストで使用します。呼び出し履歴を記録し、
//! 各操作にHTTPステータス付きの失敗を注入できます。

use super::models::{Bill, NewBill, ReceiptUpload, UploadedReceipt};
use super::store::BillsStore;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::nanoid::{generate_bill_id, generate_file_key};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    bills: Vec<Bill>,
    drafts: HashMap<String, UploadedReceipt>,
    list_calls: usize,
    created: Vec<NewBill>,
    uploads: Vec<ReceiptUpload>,
    list_failure: Option<u16>,
    create_failure: Option<u16>,
    upload_failure: Option<u16>,
}

/// メモリストア
pub struct MemoryBillsStore {
    state: Mutex<MemoryState>,
    file_base_url: String,
}

impl Default for MemoryBillsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBillsStore {
    /// 空のストアを作成する
    pub fn new() -> Self {
        Self::with_bills(Vec::new())
    }

    /// 請求書を登録済みのストアを作成する
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                bills,
                ..MemoryState::default()
            }),
            file_base_url: "https://localhost:3456/images".to_string(),
        }
    }

    fn state(&self) -> AppResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| AppError::storage(format!("メモリストアのロック取得エラー: {e}")))
    }

    fn lock_for_inspection(&self) -> MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// 一覧取得を指定ステータスで失敗させる（Noneで解除）
    pub fn fail_list_with(&self, status: Option<u16>) {
        self.lock_for_inspection().list_failure = status;
    }

    /// 作成を指定ステータスで失敗させる（Noneで解除）
    pub fn fail_create_with(&self, status: Option<u16>) {
        self.lock_for_inspection().create_failure = status;
    }

    /// 領収書アップロードを指定ステータスで失敗させる（Noneで解除）
    pub fn fail_upload_with(&self, status: Option<u16>) {
        self.lock_for_inspection().upload_failure = status;
    }

    /// 保存済みの請求書
    pub fn bills(&self) -> Vec<Bill> {
        self.lock_for_inspection().bills.clone()
    }

    /// `create` に渡されたペイロード
    pub fn created(&self) -> Vec<NewBill> {
        self.lock_for_inspection().created.clone()
    }

    /// `create_attachment` に渡されたアップロード
    pub fn uploads(&self) -> Vec<ReceiptUpload> {
        self.lock_for_inspection().uploads.clone()
    }

    /// `list` の呼び出し回数
    pub fn list_calls(&self) -> usize {
        self.lock_for_inspection().list_calls
    }
}

#[async_trait]
impl BillsStore for MemoryBillsStore {
    async fn list(&self) -> AppResult<Vec<Bill>> {
        let mut state = self.state()?;
        state.list_calls += 1;

        if let Some(status) = state.list_failure {
            return Err(AppError::with_status(status, "一覧取得に失敗しました"));
        }

        Ok(state.bills.clone())
    }

    async fn create(&self, bill: &NewBill) -> AppResult<Bill> {
        let mut state = self.state()?;
        state.created.push(bill.clone());

        if let Some(status) = state.create_failure {
            return Err(AppError::with_status(status, "請求書の作成に失敗しました"));
        }

        let id = match &bill.id {
            Some(key) => {
                if state.drafts.remove(key).is_none() {
                    return Err(AppError::with_status(
                        404,
                        format!("下書きが見つかりません: key={key}"),
                    ));
                }
                key.clone()
            }
            None => generate_bill_id(),
        };

        let stored = bill.clone().into_bill(id);
        state.bills.push(stored.clone());
        log::info!("メモリストアに請求書を保存しました: id={}", stored.id);
        Ok(stored)
    }

    async fn create_attachment(&self, upload: ReceiptUpload) -> AppResult<UploadedReceipt> {
        let mut state = self.state()?;
        state.uploads.push(upload.clone());

        if let Some(status) = state.upload_failure {
            return Err(AppError::with_status(
                status,
                "領収書のアップロードに失敗しました",
            ));
        }

        let uploaded = UploadedReceipt {
            key: generate_bill_id(),
            file_url: format!(
                "{}/{}-{}",
                self.file_base_url,
                generate_file_key(12),
                upload.file_name
            ),
            file_name: upload.file_name,
        };
        state.drafts.insert(uploaded.key.clone(), uploaded.clone());

        Ok(uploaded)
    }
}
