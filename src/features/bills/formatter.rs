//! 請求書の表示整形
//!
//! 永続レコードから表示用レコードへの変換と、一覧の並び替えを行う純粋関数群。

use super::models::{Bill, BillStatus, DisplayBill};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::parse_iso_date;
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;

/// 月の短縮表記（先頭3文字、先頭大文字）
const SHORT_MONTHS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// 日付を `<日> <月>. <年2桁>` 形式に整形する（例: `4 Avr. 04`）
pub fn format_naive_date(date: NaiveDate) -> String {
    let month = SHORT_MONTHS[date.month0() as usize];
    let year = date.year().rem_euclid(100);
    format!("{} {month}. {year:02}", date.day())
}

/// 日付文字列を整形する
///
/// # 戻り値
/// 整形済みの日付、または解析できない場合はデータ破損エラー
pub fn try_format_date(raw_date: &str) -> AppResult<String> {
    let date = parse_iso_date(raw_date)
        .map_err(|_| AppError::data_corruption(format!("日付を解析できません: {raw_date:?}")))?;
    Ok(format_naive_date(date))
}

/// 日付文字列を整形する（解析できない場合は元の文字列をそのまま返す）
pub fn format_date(raw_date: &str) -> String {
    try_format_date(raw_date).unwrap_or_else(|_| raw_date.to_string())
}

/// ステータスを表示用ラベルに変換する（不明な値はそのまま）
pub fn format_status(raw_status: &str) -> String {
    BillStatus::parse(raw_status)
        .map(|status| status.label().to_string())
        .unwrap_or_else(|| raw_status.to_string())
}

/// 請求書を表示用に整形する
///
/// 日付が解析できない場合はデータ破損エラーを返す。
pub fn format_bill(bill: Bill) -> AppResult<DisplayBill> {
    let formatted_date = try_format_date(&bill.date)?;
    let formatted_status = format_status(&bill.status);
    Ok(DisplayBill {
        bill,
        formatted_date,
        formatted_status,
    })
}

/// 日付を整形せずに表示用レコードを作る
pub fn display_with_raw_date(bill: Bill) -> DisplayBill {
    let formatted_status = format_status(&bill.status);
    DisplayBill {
        formatted_date: bill.date.clone(),
        formatted_status,
        bill,
    }
}

/// 未加工の日付で比較する（新しい順）
///
/// 解析できない日付は有効な日付より後ろに並ぶ。
fn compare_raw_dates_descending(a: &str, b: &str) -> Ordering {
    let a = parse_iso_date(a).ok();
    let b = parse_iso_date(b).ok();
    b.cmp(&a)
}

/// 未加工の日付で新しい順に並べる
///
/// 表示用の文字列ではなく元の日付を使う。同じ日付の要素は元の順序を保つ。
pub fn sort_by_date_descending(mut bills: Vec<DisplayBill>) -> Vec<DisplayBill> {
    bills.sort_by(|a, b| compare_raw_dates_descending(a.raw_date(), b.raw_date()));
    bills
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    fn bill_dated(id: &str, date: &str) -> Bill {
        Bill {
            id: id.to_string(),
            date: date.to_string(),
            status: "pending".to_string(),
            amount: 100,
            ..Bill::default()
        }
    }

    fn date_from_parts(year: u16, month: u8, day: u8) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            1970 + i32::from(year % 130),
            u32::from(month % 12) + 1,
            u32::from(day % 28) + 1,
        )
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2004-04-04"), "4 Avr. 04");
        assert_eq!(format_date("2021-05-26"), "26 Mai. 21");
        assert_eq!(format_date("2001-01-01"), "1 Jan. 01");
        assert_eq!(format_date("2002-02-02"), "2 Fév. 02");
        assert_eq!(format_date("2003-08-30"), "30 Aoû. 03");
        assert_eq!(format_date("1999-12-31"), "31 Déc. 99");
    }

    #[test]
    fn test_format_date_returns_raw_on_failure() {
        assert_eq!(format_date("2021-13-45"), "2021-13-45");
        assert_eq!(format_date("not a date"), "not a date");
        assert_eq!(format_date(""), "");
        assert!(matches!(
            try_format_date("2021-13-45"),
            Err(AppError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_format_status() {
        assert_eq!(format_status("pending"), "En attente");
        assert_eq!(format_status("accepted"), "Accepté");
        assert_eq!(format_status("refused"), "Refused");
        assert_eq!(format_status("archived"), "archived");
    }

    #[test]
    fn test_format_bill() {
        let display = format_bill(bill_dated("1", "2004-04-04")).unwrap();
        assert_eq!(display.formatted_date, "4 Avr. 04");
        assert_eq!(display.formatted_status, "En attente");
        assert_eq!(display.raw_date(), "2004-04-04");

        assert!(format_bill(bill_dated("2", "04/04/2004")).is_err());

        let fallback = display_with_raw_date(bill_dated("2", "04/04/2004"));
        assert_eq!(fallback.formatted_date, "04/04/2004");
        assert_eq!(fallback.formatted_status, "En attente");
    }

    #[test]
    fn test_sort_by_date_descending_scenario() {
        let bills = ["2004-04-04", "2001-01-01", "2002-02-02"]
            .iter()
            .enumerate()
            .map(|(i, date)| format_bill(bill_dated(&i.to_string(), date)).unwrap())
            .collect();

        let sorted = sort_by_date_descending(bills);
        let dates: Vec<&str> = sorted.iter().map(|b| b.raw_date()).collect();
        assert_eq!(dates, vec!["2004-04-04", "2002-02-02", "2001-01-01"]);
    }

    #[test]
    fn test_sort_uses_raw_date_not_display_string() {
        // 表示文字列では "9 Jan" > "10 Déc" だが、元の日付で比較する
        let bills = vec![
            format_bill(bill_dated("old", "2001-01-09")).unwrap(),
            format_bill(bill_dated("new", "2001-12-10")).unwrap(),
        ];

        let sorted = sort_by_date_descending(bills);
        assert_eq!(sorted[0].bill.id, "new");
        assert_eq!(sorted[1].bill.id, "old");
    }

    #[test]
    fn test_sort_is_stable_and_keeps_corrupt_dates_last() {
        let bills = vec![
            display_with_raw_date(bill_dated("corrupt-a", "??")),
            format_bill(bill_dated("tie-1", "2002-02-02")).unwrap(),
            format_bill(bill_dated("newest", "2003-03-03")).unwrap(),
            display_with_raw_date(bill_dated("corrupt-b", "2002-02-31")),
            format_bill(bill_dated("tie-2", "2002-02-02")).unwrap(),
        ];

        let ids: Vec<String> = sort_by_date_descending(bills)
            .into_iter()
            .map(|b| b.bill.id)
            .collect();
        assert_eq!(
            ids,
            vec!["newest", "tie-1", "tie-2", "corrupt-a", "corrupt-b"]
        );
    }

    #[quickcheck]
    fn prop_format_date_is_deterministic(year: u16, month: u8, day: u8) -> TestResult {
        let Some(date) = date_from_parts(year, month, day) else {
            return TestResult::discard();
        };
        let raw = date.format("%Y-%m-%d").to_string();
        TestResult::from_bool(format_date(&raw) == format_date(&raw) && format_date(&raw) != raw)
    }

    #[quickcheck]
    fn prop_sort_is_descending_permutation(parts: Vec<(u16, u8, u8)>) -> bool {
        let bills: Vec<DisplayBill> = parts
            .iter()
            .enumerate()
            .filter_map(|(i, (y, m, d))| date_from_parts(*y, *m, *d).map(|date| (i, date)))
            .map(|(i, date)| {
                format_bill(bill_dated(&i.to_string(), &date.format("%Y-%m-%d").to_string()))
                    .unwrap()
            })
            .collect();

        let mut input_ids: Vec<String> = bills.iter().map(|b| b.bill.id.clone()).collect();
        let sorted = sort_by_date_descending(bills);

        let descending = sorted
            .windows(2)
            .all(|pair| pair[0].raw_date() >= pair[1].raw_date());

        let mut output_ids: Vec<String> = sorted.iter().map(|b| b.bill.id.clone()).collect();
        input_ids.sort();
        output_ids.sort();

        descending && input_ids == output_ids
    }
}
