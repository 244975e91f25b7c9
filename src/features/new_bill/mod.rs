/// 請求書作成機能モジュール
///
/// - 領収書ファイルの検証とアップロード
/// - フォーム入力からの請求書ペイロードの組み立て
/// - 下書きの状態管理と作成後の画面遷移
pub mod controller;
pub mod models;

pub use controller::{build_new_bill, NewBillController};
pub use models::{BillForm, DraftState, FileSelection, SelectedFile, SubmitOutcome, DEFAULT_PCT};
