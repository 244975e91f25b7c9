//! 請求書作成コントローラー
//!
//! 領収書ファイルの検証とアップロード、フォーム入力からの請求書作成、
//! 作成後の一覧画面への遷移を担当する。

use super::models::{BillForm, DraftState, FileSelection, SelectedFile, SubmitOutcome, DEFAULT_PCT};
use crate::features::bills::models::{BillStatus, NewBill, ReceiptUpload, UploadedReceipt};
use crate::features::bills::store::BillsStore;
use crate::features::navigation::{Navigator, Route, ViewPort};
use crate::features::session::SessionContext;
use crate::shared::config::ReceiptPolicy;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{
    normalize_string, parse_iso_date, parse_leading_integer, validate_required_field,
};
use log::{debug, info, log, warn};
use std::sync::{Arc, Mutex, MutexGuard};

/// 請求書作成コントローラー
///
/// インスタンスごとに一つの下書きを持ち、新しいインスタンスを作るまで
/// リセットされない。
pub struct NewBillController {
    store: Arc<dyn BillsStore>,
    navigator: Arc<dyn Navigator>,
    view: Arc<dyn ViewPort>,
    session: SessionContext,
    policy: ReceiptPolicy,
    draft: Mutex<DraftState>,
}

impl NewBillController {
    /// 新しいコントローラーを作成する
    pub fn new(
        store: Arc<dyn BillsStore>,
        navigator: Arc<dyn Navigator>,
        view: Arc<dyn ViewPort>,
        session: SessionContext,
        policy: ReceiptPolicy,
    ) -> Self {
        Self {
            store,
            navigator,
            view,
            session,
            policy,
            draft: Mutex::new(DraftState::NoFile),
        }
    }

    /// 下書きの現在の状態
    pub fn draft_state(&self) -> DraftState {
        self.lock_draft().clone()
    }

    fn lock_draft(&self) -> MutexGuard<'_, DraftState> {
        match self.draft.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn set_draft(&self, state: DraftState) {
        *self.lock_draft() = state;
    }

    /// 選択されたファイルを検証する
    ///
    /// # バリデーション規則
    /// - メディアタイプが許可リストに含まれること
    /// - 空でなく、最大サイズ以下であること
    fn validate_file(&self, file: &SelectedFile) -> AppResult<()> {
        let content_type = file.effective_content_type();
        if !self.policy.allows(&content_type) {
            return Err(AppError::validation(format!(
                "Format de fichier non autorisé ({content_type}). Formats acceptés : {}",
                self.policy.allowed_types.join(", ")
            )));
        }

        if file.bytes.is_empty() {
            return Err(AppError::validation("Le fichier est vide"));
        }

        if file.bytes.len() as u64 > self.policy.max_file_size {
            return Err(AppError::validation(format!(
                "Le fichier est trop volumineux (max {} octets)",
                self.policy.max_file_size
            )));
        }

        Ok(())
    }

    /// ファイルが選択されたときの処理
    ///
    /// 許可されたファイルであればすぐにアップロードし、結果を下書きとして記録する。
    /// 許可されていないファイルは入力欄をクリアしてバリデーションエラーを表示し、
    /// アップロードは行わない。アップロードの失敗はログに記録される。
    /// 送信中または作成済みの下書きには新しいファイルを受け付けない。
    pub async fn on_file_selected(&self, file: SelectedFile) -> FileSelection {
        let file_name = file.file_name();

        if let Err(e) = self.validate_file(&file) {
            warn!("領収書ファイルを拒否しました: file={file_name}, error={e}");
            return self.reject_file(e);
        }

        let upload = ReceiptUpload {
            content_type: file.effective_content_type(),
            file_name,
            bytes: file.bytes,
            email: self.session.email.clone(),
        };

        {
            let mut draft = self.lock_draft();
            if matches!(*draft, DraftState::Submitting(_) | DraftState::Done) {
                warn!("下書きの状態が不正なためファイルを拒否しました: state={draft:?}");
                drop(draft);
                return self.reject_file(AppError::invalid_state(
                    "Cette note de frais a déjà été envoyée",
                ));
            }
            *draft = DraftState::Uploading;
        }

        debug!(
            "領収書をアップロードします: file={}, size={}",
            upload.file_name,
            upload.bytes.len()
        );

        match self.store.create_attachment(upload).await {
            Ok(receipt) => {
                info!(
                    "領収書アップロード完了: key={}, url={}",
                    receipt.key, receipt.file_url
                );
                self.set_draft(DraftState::Uploaded(receipt.clone()));
                FileSelection::Uploaded(receipt)
            }
            Err(e) => {
                log!(
                    e.severity().log_level(),
                    "領収書のアップロードに失敗しました: {e}"
                );
                self.set_draft(DraftState::NoFile);
                FileSelection::UploadFailed
            }
        }
    }

    /// フォームが送信されたときの処理
    ///
    /// # 戻り値
    /// - 作成に成功した場合は `SubmitOutcome::Created`（一覧画面へ遷移済み）
    /// - 入力エラーや領収書未アップロードの場合は `SubmitOutcome::Rejected`
    /// - ストアの失敗はビューに表示したうえでエラーとして返す
    pub async fn on_submit(&self, form: BillForm) -> AppResult<SubmitOutcome> {
        let payload = {
            let mut draft = self.lock_draft();

            let Some(receipt) = draft.uploaded().cloned() else {
                warn!("領収書がアップロードされていないため送信を拒否しました: state={draft:?}");
                drop(draft);
                return Ok(self.reject(AppError::invalid_state(
                    "Veuillez d'abord ajouter un justificatif",
                )));
            };

            let payload = match build_new_bill(&form, &receipt, &self.session) {
                Ok(payload) => payload,
                Err(e) => {
                    drop(draft);
                    return Ok(self.reject(e));
                }
            };

            *draft = DraftState::Submitting(receipt);
            payload
        };

        match self.store.create(&payload).await {
            Ok(created) => {
                info!("請求書を作成しました: id={}", created.id);
                self.set_draft(DraftState::Done);
                self.navigator.navigate(Route::Bills);
                Ok(SubmitOutcome::Created(created))
            }
            Err(e) => {
                log!(e.severity().log_level(), "請求書の作成に失敗しました: {e}");
                let mut draft = self.lock_draft();
                if let DraftState::Submitting(receipt) = &*draft {
                    *draft = DraftState::Uploaded(receipt.clone());
                }
                drop(draft);
                self.view.show_error(&e.user_message());
                Err(e)
            }
        }
    }

    fn reject_file(&self, e: AppError) -> FileSelection {
        let reason = e.user_message();
        self.view.clear_file_input();
        self.view.show_validation_error(&reason);
        FileSelection::Rejected { reason }
    }

    fn reject(&self, e: AppError) -> SubmitOutcome {
        let reason = e.user_message();
        self.view.show_validation_error(&reason);
        SubmitOutcome::Rejected { reason }
    }
}

/// フォーム入力とアップロード済みの領収書から送信用の請求書を作る
///
/// - `type` と `name` は必須
/// - `date` はYYYY-MM-DD形式の実在する日付
/// - `amount` は先頭の整数部分を読み、読めない場合は0（負の値はエラー）
/// - `pct` は空または数値でない場合に20
pub fn build_new_bill(
    form: &BillForm,
    receipt: &UploadedReceipt,
    session: &SessionContext,
) -> AppResult<NewBill> {
    validate_required_field(&form.bill_type, "type")?;
    validate_required_field(&form.name, "nom")?;
    parse_iso_date(&form.date)?;

    let amount = parse_leading_integer(&form.amount).unwrap_or(0);
    if amount < 0 {
        return Err(AppError::validation(
            "Le montant doit être positif ou nul",
        ));
    }

    let pct = parse_leading_integer(&form.pct).unwrap_or(DEFAULT_PCT);

    Ok(NewBill {
        id: Some(receipt.key.clone()),
        email: session.email.clone(),
        bill_type: normalize_string(&form.bill_type),
        name: normalize_string(&form.name),
        date: normalize_string(&form.date),
        amount,
        vat: normalize_string(&form.vat),
        pct,
        commentary: form.commentary.clone(),
        file_url: receipt.file_url.clone(),
        file_name: receipt.file_name.clone(),
        status: BillStatus::Pending.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::bills::formatter::format_bill;
    use crate::features::bills::memory_store::MemoryBillsStore;
    use crate::features::navigation::view::recording::{RecordingView, ViewEvent};
    use crate::features::navigation::Router;

    struct Harness {
        store: Arc<MemoryBillsStore>,
        router: Arc<Router>,
        view: Arc<RecordingView>,
        controller: NewBillController,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryBillsStore::new());
        let router = Arc::new(Router::new(Route::NewBill));
        let view = Arc::new(RecordingView::default());
        let controller = NewBillController::new(
            store.clone(),
            router.clone(),
            view.clone(),
            SessionContext::employee("employee@test.tld"),
            ReceiptPolicy::default(),
        );
        Harness {
            store,
            router,
            view,
            controller,
        }
    }

    fn png() -> SelectedFile {
        SelectedFile::new("C:\\fakepath\\test.png", "image/png", b"image".to_vec())
    }

    fn form() -> BillForm {
        BillForm {
            bill_type: "Transports".to_string(),
            name: "Test".to_string(),
            date: "2021-05-26".to_string(),
            amount: "100".to_string(),
            vat: "10".to_string(),
            pct: "19".to_string(),
            commentary: "Test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_pdf_is_rejected_without_upload() {
        let h = harness();
        let pdf = SelectedFile::new("facture.pdf", "application/pdf", b"%PDF".to_vec());

        let selection = h.controller.on_file_selected(pdf).await;

        assert!(matches!(selection, FileSelection::Rejected { .. }));
        assert!(h.store.uploads().is_empty());
        let events = h.view.events();
        assert_eq!(events[0], ViewEvent::FileInputCleared);
        assert!(matches!(events[1], ViewEvent::ValidationError(_)));
        assert_eq!(h.controller.draft_state(), DraftState::NoFile);
    }

    #[tokio::test]
    async fn test_media_type_check_ignores_case_and_parameters() {
        let h = harness();
        let file = SelectedFile::new("photo.JPG", "IMAGE/JPEG; charset=binary", b"x".to_vec());

        let selection = h.controller.on_file_selected(file).await;

        assert!(matches!(selection, FileSelection::Uploaded(_)));
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected() {
        let store = Arc::new(MemoryBillsStore::new());
        let view = Arc::new(RecordingView::default());
        let controller = NewBillController::new(
            store.clone(),
            Arc::new(Router::default()),
            view.clone(),
            SessionContext::anonymous(),
            ReceiptPolicy::from_list("image/png", 4),
        );

        let selection = controller
            .on_file_selected(SelectedFile::new("big.png", "image/png", vec![0; 5]))
            .await;

        assert!(matches!(selection, FileSelection::Rejected { .. }));
        assert!(store.uploads().is_empty());
        assert!(view.events().contains(&ViewEvent::FileInputCleared));
    }

    #[tokio::test]
    async fn test_upload_is_scoped_to_session_email() {
        let h = harness();

        let selection = h.controller.on_file_selected(png()).await;

        let FileSelection::Uploaded(receipt) = selection else {
            panic!("アップロードに成功するはず");
        };
        let uploads = h.store.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].file_name, "test.png");
        assert_eq!(uploads[0].content_type, "image/png");
        assert_eq!(uploads[0].email.as_deref(), Some("employee@test.tld"));
        assert_eq!(h.controller.draft_state(), DraftState::Uploaded(receipt));
    }

    #[tokio::test]
    async fn test_upload_failure_is_logged_and_resets_draft() {
        let h = harness();
        h.store.fail_upload_with(Some(500));

        let selection = h.controller.on_file_selected(png()).await;

        assert_eq!(selection, FileSelection::UploadFailed);
        assert_eq!(h.controller.draft_state(), DraftState::NoFile);
        assert!(h.view.events().is_empty());
    }

    #[tokio::test]
    async fn test_submit_creates_bill_and_navigates() {
        let h = harness();
        let FileSelection::Uploaded(receipt) = h.controller.on_file_selected(png()).await else {
            panic!("アップロードに成功するはず");
        };

        let outcome = h.controller.on_submit(form()).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Created(_)));
        let created = h.store.created();
        assert_eq!(created.len(), 1);
        let payload = &created[0];
        assert_eq!(payload.id.as_deref(), Some(receipt.key.as_str()));
        assert_eq!(payload.bill_type, "Transports");
        assert_eq!(payload.amount, 100);
        assert_eq!(payload.pct, 19);
        assert_eq!(payload.vat, "10");
        assert_eq!(payload.status, "pending");
        assert_eq!(payload.email.as_deref(), Some("employee@test.tld"));
        assert_eq!(payload.file_url, receipt.file_url);
        assert_eq!(payload.file_name, "test.png");

        assert_eq!(h.router.current(), Route::Bills);
        assert_eq!(h.controller.draft_state(), DraftState::Done);
    }

    #[tokio::test]
    async fn test_blank_pct_defaults_to_twenty() {
        let h = harness();
        h.controller.on_file_selected(png()).await;

        let blank = BillForm {
            pct: String::new(),
            ..form()
        };
        h.controller.on_submit(blank).await.unwrap();

        assert_eq!(h.store.created()[0].pct, 20);
    }

    #[tokio::test]
    async fn test_submit_before_upload_is_rejected() {
        let h = harness();

        let outcome = h.controller.on_submit(form()).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Rejected { .. }));
        assert!(h.store.created().is_empty());
        assert_eq!(h.router.current(), Route::NewBill);
        assert!(matches!(h.view.events()[0], ViewEvent::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_invalid_form_keeps_draft() {
        let h = harness();
        h.controller.on_file_selected(png()).await;

        let invalid = BillForm {
            date: "26/05/2021".to_string(),
            ..form()
        };
        let outcome = h.controller.on_submit(invalid).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Rejected { .. }));
        assert!(h.store.created().is_empty());
        assert!(h.controller.draft_state().uploaded().is_some());

        // 修正して再送信できる
        h.controller.on_submit(form()).await.unwrap();
        assert_eq!(h.router.current(), Route::Bills);
    }

    #[tokio::test]
    async fn test_create_failure_is_surfaced_without_navigation() {
        let h = harness();
        h.controller.on_file_selected(png()).await;
        h.store.fail_create_with(Some(500));

        let error = h.controller.on_submit(form()).await.unwrap_err();

        assert_eq!(error.status(), Some(500));
        assert_eq!(h.router.current(), Route::NewBill);
        assert!(h
            .view
            .events()
            .contains(&ViewEvent::Error("Erreur 500".to_string())));
        assert!(h.controller.draft_state().uploaded().is_some());
    }

    #[tokio::test]
    async fn test_file_after_done_is_rejected() {
        let h = harness();
        h.controller.on_file_selected(png()).await;
        h.controller.on_submit(form()).await.unwrap();
        assert_eq!(h.controller.draft_state(), DraftState::Done);

        let selection = h
            .controller
            .on_file_selected(SelectedFile::new("b.png", "image/png", b"b".to_vec()))
            .await;

        assert!(matches!(selection, FileSelection::Rejected { .. }));
        assert_eq!(h.store.uploads().len(), 1);
        assert_eq!(h.controller.draft_state(), DraftState::Done);

        // 同じインスタンスから二件目は作成できない
        let outcome = h.controller.on_submit(form()).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Rejected { .. }));
        assert_eq!(h.store.bills().len(), 1);
    }

    #[tokio::test]
    async fn test_file_during_submission_is_rejected() {
        let h = harness();
        let FileSelection::Uploaded(receipt) = h.controller.on_file_selected(png()).await else {
            panic!("アップロードに成功するはず");
        };
        h.controller.set_draft(DraftState::Submitting(receipt.clone()));

        let selection = h.controller.on_file_selected(png()).await;

        assert!(matches!(selection, FileSelection::Rejected { .. }));
        assert_eq!(h.store.uploads().len(), 1);
        assert_eq!(h.controller.draft_state(), DraftState::Submitting(receipt));
        assert!(h.view.events().contains(&ViewEvent::FileInputCleared));
    }

    #[test]
    fn test_build_new_bill_coercion() {
        let receipt = UploadedReceipt {
            key: "1234".to_string(),
            file_url: "https://localhost:3456/images/test.jpg".to_string(),
            file_name: "test.jpg".to_string(),
        };
        let session = SessionContext::anonymous();

        let payload = build_new_bill(
            &BillForm {
                amount: "100.75".to_string(),
                pct: "abc".to_string(),
                ..form()
            },
            &receipt,
            &session,
        )
        .unwrap();
        assert_eq!(payload.amount, 100);
        assert_eq!(payload.pct, 20);
        assert_eq!(payload.email, None);

        let payload = build_new_bill(
            &BillForm {
                amount: "abc".to_string(),
                pct: "0".to_string(),
                ..form()
            },
            &receipt,
            &session,
        )
        .unwrap();
        assert_eq!(payload.amount, 0);
        assert_eq!(payload.pct, 0);

        let negative = BillForm {
            amount: "-5".to_string(),
            ..form()
        };
        assert!(build_new_bill(&negative, &receipt, &session).is_err());

        let missing_name = BillForm {
            name: "  ".to_string(),
            ..form()
        };
        assert!(build_new_bill(&missing_name, &receipt, &session).is_err());
    }

    #[test]
    fn test_submitted_date_survives_formatting() {
        let receipt = UploadedReceipt {
            key: "1234".to_string(),
            file_url: "https://localhost:3456/images/test.jpg".to_string(),
            file_name: "test.jpg".to_string(),
        };
        let payload = build_new_bill(&form(), &receipt, &SessionContext::anonymous()).unwrap();

        let display = format_bill(payload.into_bill(receipt.key.clone())).unwrap();

        assert_eq!(display.raw_date(), "2021-05-26");
        assert_eq!(display.formatted_status, "En attente");
    }
}
