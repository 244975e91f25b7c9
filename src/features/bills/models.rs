use crate::shared::errors::AppError;
use crate::shared::utils::parse_leading_integer;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 請求書データモデル（ストアゲートウェイが保持する永続レコード）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub email: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub bill_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// YYYY-MM-DD形式の日付（未加工）
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub amount: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vat: String,
    #[serde(default, deserialize_with = "lenient_optional_integer")]
    pub pct: Option<i64>,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub commentary: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub file_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub file_name: Option<String>,
    /// バックエンドが設定するステータス（`pending` / `accepted` / `refused`）
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
}

/// 請求書のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    /// 保存値からステータスを解析する（不明な値はNone）
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(BillStatus::Pending),
            "accepted" => Some(BillStatus::Accepted),
            "refused" => Some(BillStatus::Refused),
            _ => None,
        }
    }

    /// 保存値
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Accepted => "accepted",
            BillStatus::Refused => "refused",
        }
    }

    /// 表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            BillStatus::Pending => "En attente",
            BillStatus::Accepted => "Accepté",
            BillStatus::Refused => "Refused",
        }
    }
}

/// 表示用の請求書（一回の描画の間だけ使われる）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBill {
    /// 未加工の請求書
    #[serde(flatten)]
    pub bill: Bill,
    /// 表示用の日付（整形できない場合は未加工の日付）
    pub formatted_date: String,
    /// 表示用のステータス
    pub formatted_status: String,
}

impl DisplayBill {
    /// 未加工の日付
    pub fn raw_date(&self) -> &str {
        &self.bill.date
    }
}

/// 新規作成時にストアへ送る請求書
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBill {
    /// 領収書アップロード時にストアが割り当てたキー
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub bill_type: String,
    pub name: String,
    pub date: String,
    pub amount: i64,
    pub vat: String,
    pub pct: i64,
    pub commentary: String,
    pub file_url: String,
    pub file_name: String,
    pub status: String,
}

impl NewBill {
    /// ストアが保存するレコードへ変換する
    pub fn into_bill(self, id: String) -> Bill {
        Bill {
            id,
            email: self.email,
            bill_type: self.bill_type,
            name: self.name,
            date: self.date,
            amount: self.amount,
            vat: self.vat,
            pct: Some(self.pct),
            commentary: Some(self.commentary),
            file_url: Some(self.file_url),
            file_name: Some(self.file_name),
            status: self.status,
        }
    }
}

/// 領収書ファイルのアップロード要求
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// アップロードするユーザーのメールアドレス
    pub email: Option<String>,
}

/// 領収書アップロードの結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedReceipt {
    /// ストアが割り当てた下書きレコードのキー
    pub key: String,
    pub file_url: String,
    #[serde(default)]
    pub file_name: String,
}

/// 請求書一覧ビューに渡すデータ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillsViewData {
    pub data: Vec<DisplayBill>,
    pub loading: bool,
    pub error: Option<String>,
}

impl BillsViewData {
    /// 読み込み中の状態
    pub fn loading() -> Self {
        Self {
            data: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// 読み込み完了の状態
    pub fn loaded(data: Vec<DisplayBill>) -> Self {
        Self {
            data,
            loading: false,
            error: None,
        }
    }

    /// 読み込み失敗の状態
    pub fn failed(error: &AppError) -> Self {
        Self {
            data: Vec::new(),
            loading: false,
            error: Some(error.user_message()),
        }
    }
}

fn integer_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_integer(s),
        _ => None,
    }
}

/// 数値または数字の文字列を整数として読む（読めない場合は0）
fn lenient_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(integer_from_value(&value).unwrap_or(0))
}

fn lenient_optional_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(integer_from_value(&value))
}

fn string_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// 文字列または数値を文字列として読む（nullは空文字列）
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(string_from_value(value).unwrap_or_default())
}

fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(string_from_value(value))
}
