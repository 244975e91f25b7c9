use crate::features::bills::models::{Bill, UploadedReceipt};
use crate::shared::utils::{content_type_from_file_name, file_name_from_path};
use serde::{Deserialize, Serialize};

/// 割合（pct）が空または数値でない場合の既定値
pub const DEFAULT_PCT: i64 = 20;

/// ファイル入力で選択されたファイル
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    /// 入力欄の値（`C:\fakepath\test.png` のようなパスの場合もある）
    pub path_or_name: String,
    /// 宣言されたメディアタイプ（空の場合は拡張子から推定する）
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(
        path_or_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            path_or_name: path_or_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// パス区切りを除いたファイル名
    pub fn file_name(&self) -> String {
        file_name_from_path(&self.path_or_name)
    }

    /// 判定に使うメディアタイプ
    pub fn effective_content_type(&self) -> String {
        let declared = self.content_type.trim();
        if declared.is_empty() {
            content_type_from_file_name(&self.file_name()).to_string()
        } else {
            declared.to_string()
        }
    }
}

/// 送信時のフォーム入力値（すべて未加工の文字列）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillForm {
    #[serde(rename = "type")]
    pub bill_type: String,
    pub name: String,
    pub date: String,
    pub amount: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

/// 作成中の下書きの状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DraftState {
    /// ファイル未選択
    #[default]
    NoFile,
    /// 領収書をアップロード中
    Uploading,
    /// アップロード済み
    Uploaded(UploadedReceipt),
    /// ストアへ送信中
    Submitting(UploadedReceipt),
    /// 作成完了
    Done,
}

impl DraftState {
    /// アップロード済みの領収書（送信可能な状態のときのみ）
    pub fn uploaded(&self) -> Option<&UploadedReceipt> {
        match self {
            DraftState::Uploaded(receipt) => Some(receipt),
            _ => None,
        }
    }
}

/// ファイル選択の結果
#[derive(Debug, Clone, PartialEq)]
pub enum FileSelection {
    /// アップロードに成功した
    Uploaded(UploadedReceipt),
    /// 許可されていないファイルのため入力をクリアした
    Rejected { reason: String },
    /// アップロードに失敗した（ログ済み）
    UploadFailed,
}

/// 送信の結果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// 作成され、一覧画面へ遷移した
    Created(Bill),
    /// 入力エラーのため送信しなかった
    Rejected { reason: String },
}
