/// ID生成ユーティリティ
pub mod nanoid;

use crate::shared::errors::{AppError, AppResult};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// YYYY-MM-DD形式の日付パターン
static ISO_DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("ISO日付の正規表現は常に有効")
});

/// 日付文字列を解析する
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # 戻り値
/// 実在する日付の場合はNaiveDate、それ以外はバリデーションエラー
pub fn parse_iso_date(date_str: &str) -> AppResult<NaiveDate> {
    let trimmed = date_str.trim();

    if !ISO_DATE_PATTERN.is_match(trimmed) {
        return Err(AppError::validation(format!(
            "日付はYYYY-MM-DD形式で入力してください: {date_str}"
        )));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("無効な日付です: {date_str}")))
}

/// 必須フィールドのバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `field_name` - フィールド名（エラーメッセージ用）
pub fn validate_required_field(text: &str, field_name: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::validation(format!(
            "Le champ {field_name} est obligatoire"
        )));
    }
    Ok(())
}

/// 文字列の正規化（前後の空白を削除）
pub fn normalize_string(text: &str) -> String {
    text.trim().to_string()
}

/// 文字列先頭の整数部分を解析する
///
/// 前後の空白を無視し、符号と先頭の数字列のみを読む。
/// `"100.5"` は `100`、`"12abc"` は `12` となり、数字で始まらない場合はNone。
pub fn parse_leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());

    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

/// パス文字列からファイル名部分を取り出す
///
/// ブラウザが付与する `C:\fakepath\` のような区切りにも対応する。
pub fn file_name_from_path(path: &str) -> String {
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}

/// ファイル名からContent-Typeを推定する
pub fn content_type_from_file_name(file_name: &str) -> &'static str {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "jpg" => "image/jpg",
        "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
