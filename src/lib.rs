// 機能モジュール構造
pub mod features;
pub mod shared;

use features::bills::{BillsController, BillsStore, MemoryBillsStore, RestBillsStore};
use features::navigation::{Route, Router, ViewPort};
use features::new_bill::NewBillController;
use features::session::{FileStorage, LocalStorage, SessionContext};
use log::info;
use shared::api_client::ApiClient;
use shared::config::environment::{
    initialize_logging_system, load_environment_variables, ApiConfig, ReceiptPolicy, StoreBackend,
};
use shared::config::{initialize_application, log_initialization_complete};
use shared::errors::AppResult;
use std::sync::Arc;

/// アプリケーション全体で共有される協調オブジェクト
///
/// セッション、ストアゲートウェイ、ルーターを保持し、
/// 画面ごとのコントローラーを組み立てる。
pub struct BilledApp {
    session: SessionContext,
    store: Arc<dyn BillsStore>,
    router: Arc<Router>,
    policy: ReceiptPolicy,
}

impl BilledApp {
    /// 環境設定からアプリケーションを起動する
    ///
    /// # 処理内容
    /// 1. 環境変数の読み込みとログシステムの初期化
    /// 2. ローカルストレージの準備とセッションの構築
    /// 3. ストアゲートウェイ（REST / メモリ）の作成
    pub fn bootstrap() -> AppResult<Self> {
        // 環境に応じた.envファイルを読み込み（ログシステム初期化前に実行）
        load_environment_variables();
        initialize_logging_system();

        info!("アプリケーション初期化を開始します...");

        let initialization = initialize_application()?;
        let storage = FileStorage::new(initialization.storage_path.clone());
        let session = SessionContext::from_storage(&storage);

        let store: Arc<dyn BillsStore> = match StoreBackend::from_env() {
            StoreBackend::Rest => {
                let api_client = ApiClient::new_with_config(ApiConfig::from_env())?;
                info!(
                    "RESTストアを使用します: base_url={}",
                    api_client.config().base_url
                );
                Arc::new(RestBillsStore::new(api_client, &session))
            }
            StoreBackend::Memory => {
                info!("メモリストアを使用します");
                Arc::new(MemoryBillsStore::new())
            }
        };

        let app = Self::new(session, store, ReceiptPolicy::from_env());

        log_initialization_complete(&initialization);
        info!("アプリケーション初期化が完了しました");

        Ok(app)
    }

    /// 協調オブジェクトを指定して作成する
    ///
    /// セッションがあれば一覧画面から、なければログイン画面から開始する。
    pub fn new(session: SessionContext, store: Arc<dyn BillsStore>, policy: ReceiptPolicy) -> Self {
        let initial = if session.email.is_some() {
            Route::Bills
        } else {
            Route::Login
        };

        Self {
            session,
            store,
            router: Arc::new(Router::new(initial)),
            policy,
        }
    }

    /// ローカルストレージからセッションを読み込んで作成する
    pub fn with_storage(
        storage: &dyn LocalStorage,
        store: Arc<dyn BillsStore>,
        policy: ReceiptPolicy,
    ) -> Self {
        Self::new(SessionContext::from_storage(storage), store, policy)
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn router(&self) -> Arc<Router> {
        self.router.clone()
    }

    /// 請求書一覧コントローラーを作成する
    pub fn bills_controller(&self, view: Arc<dyn ViewPort>) -> BillsController {
        BillsController::new(
            self.store.clone(),
            self.router.clone(),
            view,
            self.session.clone(),
        )
    }

    /// 請求書作成コントローラーを作成する（下書きは新しい状態から始まる）
    pub fn new_bill_controller(&self, view: Arc<dyn ViewPort>) -> NewBillController {
        NewBillController::new(
            self.store.clone(),
            self.router.clone(),
            view,
            self.session.clone(),
            self.policy.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use features::bills::{Bill, ReceiptTrigger};
    use features::navigation::view::recording::RecordingView;
    use features::new_bill::{BillForm, FileSelection, SelectedFile, SubmitOutcome};
    use features::session::{MemoryStorage, StorageKeys};

    fn employee_storage() -> MemoryStorage {
        let storage = MemoryStorage::new();
        storage
            .set_item(StorageKeys::USER, r#"{"type":"Employee","email":"a@a"}"#)
            .unwrap();
        storage
    }

    #[test]
    fn test_initial_route_depends_on_session() {
        let store: Arc<dyn BillsStore> = Arc::new(MemoryBillsStore::new());

        let app = BilledApp::with_storage(&employee_storage(), store.clone(), ReceiptPolicy::default());
        assert_eq!(app.session().email.as_deref(), Some("a@a"));
        assert_eq!(app.router().current(), Route::Bills);

        let anonymous = BilledApp::with_storage(&MemoryStorage::new(), store, ReceiptPolicy::default());
        assert_eq!(anonymous.router().current(), Route::Login);
    }

    #[tokio::test]
    async fn test_new_bill_flow_shows_up_in_list() {
        let store = Arc::new(MemoryBillsStore::with_bills(vec![Bill {
            id: "old".to_string(),
            date: "2004-04-04".to_string(),
            amount: 400,
            status: "accepted".to_string(),
            ..Bill::default()
        }]));
        let app = BilledApp::with_storage(&employee_storage(), store.clone(), ReceiptPolicy::default());
        let view = Arc::new(RecordingView::default());

        let bills = app.bills_controller(view.clone());
        bills.on_new_bill_requested();
        assert_eq!(app.router().current(), Route::NewBill);

        let new_bill = app.new_bill_controller(view.clone());
        let selection = new_bill
            .on_file_selected(SelectedFile::new("test.png", "image/png", b"png".to_vec()))
            .await;
        assert!(matches!(selection, FileSelection::Uploaded(_)));

        let outcome = new_bill
            .on_submit(BillForm {
                bill_type: "Transports".to_string(),
                name: "Test".to_string(),
                date: "2021-05-26".to_string(),
                amount: "100".to_string(),
                vat: "10".to_string(),
                pct: "19".to_string(),
                commentary: "Test".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::Created(_)));
        assert_eq!(app.router().current(), Route::Bills);

        let listed = bills.fetch_bills().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].raw_date(), "2021-05-26");
        assert_eq!(listed[0].bill.email.as_deref(), Some("a@a"));
        assert_eq!(listed[1].raw_date(), "2004-04-04");

        let file_url = listed[0].bill.file_url.clone();
        let overlay = bills.on_receipt_requested(&ReceiptTrigger {
            bill_url: file_url,
            container_width: 600,
        });
        assert_eq!(overlay.map(|o| o.width), Some(300));
    }
}
