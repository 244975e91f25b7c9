/// 請求書機能モジュール
///
/// このモジュールは請求書一覧に関連する機能を提供します：
/// - 請求書データモデルと表示用モデル
/// - 日付・ステータスの表示用整形と日付順の並び替え
/// - ストアゲートウェイ（REST実装・メモリ実装）
/// - 一覧画面のコントローラー
pub mod controller;
pub mod formatter;
pub mod memory_store;
pub mod models;
pub mod rest_store;
pub mod store;

// モデル
pub use models::{
    Bill, BillStatus, BillsViewData, DisplayBill, NewBill, ReceiptUpload, UploadedReceipt,
};

// 整形
pub use formatter::{format_bill, format_date, format_status, sort_by_date_descending};

// ストアゲートウェイ
pub use memory_store::MemoryBillsStore;
pub use rest_store::RestBillsStore;
pub use store::BillsStore;

// コントローラー
pub use controller::{BillsController, ReceiptTrigger};
