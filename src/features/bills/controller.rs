//! 請求書一覧コントローラー
//!
//! ストアから請求書を取得して整形・並び替えを行い、一覧画面の操作
//! （新規作成画面への遷移、領収書のプレビュー）を処理する。

use super::formatter::{
    display_with_raw_date, format_status, sort_by_date_descending, try_format_date,
};
use super::models::{BillsViewData, DisplayBill};
use super::store::BillsStore;
use crate::features::navigation::{Navigator, ReceiptOverlay, Route, ViewPort};
use crate::features::session::SessionContext;
use crate::shared::errors::AppResult;
use log::{debug, log, warn};
use std::sync::Arc;
use url::Url;

/// 領収書アイコンがクリックされたときにビューから渡される情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptTrigger {
    /// アイコンに紐付いた領収書URL（`data-bill-url`）
    pub bill_url: Option<String>,
    /// オーバーレイの幅（ピクセル）
    pub container_width: u32,
}

/// 請求書一覧コントローラー
pub struct BillsController {
    store: Arc<dyn BillsStore>,
    navigator: Arc<dyn Navigator>,
    view: Arc<dyn ViewPort>,
    session: SessionContext,
}

impl BillsController {
    /// 新しいコントローラーを作成する
    pub fn new(
        store: Arc<dyn BillsStore>,
        navigator: Arc<dyn Navigator>,
        view: Arc<dyn ViewPort>,
        session: SessionContext,
    ) -> Self {
        Self {
            store,
            navigator,
            view,
            session,
        }
    }

    /// 請求書を取得し、表示用に整形して新しい順に返す
    ///
    /// 日付が壊れたレコードは未加工の日付のまま含める。
    /// ストアのエラーはそのまま呼び出し元へ返し、リトライはしない。
    pub async fn fetch_bills(&self) -> AppResult<Vec<DisplayBill>> {
        debug!(
            "請求書一覧を取得します: user={}",
            self.session.email_or_empty()
        );

        let bills = self.store.list().await?;

        let display_bills = bills
            .into_iter()
            .map(|bill| match try_format_date(&bill.date) {
                Ok(formatted_date) => DisplayBill {
                    formatted_status: format_status(&bill.status),
                    formatted_date,
                    bill,
                },
                Err(e) => {
                    warn!("請求書の整形に失敗しました: id={}, error={e}", bill.id);
                    display_with_raw_date(bill)
                }
            })
            .collect();

        Ok(sort_by_date_descending(display_bills))
    }

    /// 一覧画面に渡すデータを取得する
    ///
    /// 失敗した場合はエラー文言（`Erreur 404` など）を含むデータを返す。
    pub async fn load_view(&self) -> BillsViewData {
        match self.fetch_bills().await {
            Ok(bills) => BillsViewData::loaded(bills),
            Err(e) => {
                log!(
                    e.severity().log_level(),
                    "請求書一覧の取得に失敗しました: {e}"
                );
                BillsViewData::failed(&e)
            }
        }
    }

    /// 新規作成画面へ遷移する
    pub fn on_new_bill_requested(&self) {
        self.navigator.navigate(Route::NewBill);
    }

    /// 領収書をオーバーレイで表示する
    ///
    /// URLがない、またはhttp(s)でない場合は何もしない。
    pub fn on_receipt_requested(&self, trigger: &ReceiptTrigger) -> Option<ReceiptOverlay> {
        let raw_url = trigger
            .bill_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())?;

        match Url::parse(raw_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                let overlay = ReceiptOverlay::new(raw_url, trigger.container_width);
                self.view.show_receipt(&overlay);
                Some(overlay)
            }
            Ok(url) => {
                warn!("対応していないURLスキームです: {}", url.scheme());
                None
            }
            Err(e) => {
                warn!("領収書URLを解析できません: url={raw_url}, error={e}");
                None
            }
        }
    }
}
