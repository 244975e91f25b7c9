use super::local_storage::{LocalStorage, StorageKeys};
use serde::{Deserialize, Serialize};

/// ローカルストレージに保存されたユーザー情報
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredUser {
    #[serde(rename = "type", default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// コントローラーに渡される読み取り専用のセッション情報
///
/// 構築時に一度だけローカルストレージから読み込まれ、以後は変化しない。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    /// ユーザー種別（`Employee` など）
    pub user_type: Option<String>,
    /// ユーザーのメールアドレス
    pub email: Option<String>,
    /// ストアゲートウェイに送る認証トークン
    pub token: Option<String>,
}

impl SessionContext {
    /// 匿名セッション（メールアドレスなし）
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// 従業員セッションを作成する
    pub fn employee(email: impl Into<String>) -> Self {
        Self {
            user_type: Some("Employee".to_string()),
            email: Some(email.into()),
            token: None,
        }
    }

    /// トークンを設定する
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// ローカルストレージからセッションを構築する
    ///
    /// ユーザー情報が存在しない、または壊れている場合は匿名セッションとして扱う。
    pub fn from_storage(storage: &dyn LocalStorage) -> Self {
        let user = match storage.get_item(StorageKeys::USER) {
            Ok(Some(raw)) => serde_json::from_str::<StoredUser>(&raw).unwrap_or_else(|e| {
                log::warn!("保存済みユーザー情報の解析に失敗しました: {e}");
                StoredUser::default()
            }),
            Ok(None) => {
                log::debug!("保存済みユーザー情報がありません");
                StoredUser::default()
            }
            Err(e) => {
                log::warn!("ユーザー情報の読み込みに失敗しました: {e}");
                StoredUser::default()
            }
        };

        let token = storage.get_item(StorageKeys::JWT).unwrap_or_else(|e| {
            log::warn!("認証トークンの読み込みに失敗しました: {e}");
            None
        });

        Self {
            user_type: user.user_type,
            email: user.email.filter(|email| !email.trim().is_empty()),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// メールアドレス（未設定の場合は空文字列）
    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }
}
