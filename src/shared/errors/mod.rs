use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// バリデーション関連のエラー（ファイル形式、必須項目など）
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 外部サービス連携でのエラー（接続失敗、レスポンス解析失敗など）
    #[error("外部サービスエラー: {0}")]
    ExternalService(String),

    /// ストアゲートウェイが返したHTTPステータス付きのエラー
    #[error("ストアエラー: status={status}, {message}")]
    Status { status: u16, message: String },

    /// 保存済みレコードの破損（不正な日付など）
    #[error("データ破損: {0}")]
    DataCorruption(String),

    /// 状態遷移として許可されない操作
    #[error("不正な状態: {0}")]
    InvalidState(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// ローカルストレージ関連のエラー
    #[error("ローカルストレージエラー: {0}")]
    Storage(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（外部サービス一時的エラーなど）
    Medium,
    /// 高重要度（設定エラー、サーバーエラーなど）
    High,
}

impl ErrorSeverity {
    /// 重要度に対応するログレベル
    pub fn log_level(&self) -> log::Level {
        match self {
            ErrorSeverity::Low => log::Level::Info,
            ErrorSeverity::Medium => log::Level::Warn,
            ErrorSeverity::High => log::Level::Error,
        }
    }
}

impl AppError {
    /// ビューに表示するためのメッセージを取得
    ///
    /// ステータス付きのエラーは `Erreur <code>` として表示される。
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Status { status, .. } => format!("Erreur {status}"),
            AppError::InvalidState(msg) => msg.clone(),
            AppError::ExternalService(_) => "Erreur".to_string(),
            AppError::DataCorruption(_) => "Erreur de données".to_string(),
            AppError::Configuration(_) => "Erreur de configuration".to_string(),
            AppError::Storage(_) | AppError::Io(_) => "Erreur de stockage local".to_string(),
            AppError::Json(_) => "Erreur de format".to_string(),
        }
    }

    /// HTTPステータスコードを取得（ステータス付きエラーの場合のみ）
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// エラーの重要度を取得
    ///
    /// # 戻り値
    /// エラーの重要度レベル
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::InvalidState(_) => ErrorSeverity::Low,
            AppError::ExternalService(_) => ErrorSeverity::Medium,
            AppError::Status { status, .. } if *status >= 500 => ErrorSeverity::High,
            AppError::Status { .. } => ErrorSeverity::Medium,
            AppError::DataCorruption(_) => ErrorSeverity::Medium,
            AppError::Configuration(_) => ErrorSeverity::High,
            AppError::Storage(_) => ErrorSeverity::High,
            AppError::Io(_) => ErrorSeverity::Medium,
            AppError::Json(_) => ErrorSeverity::Medium,
        }
    }

    /// バリデーションエラーを作成するヘルパー関数
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 外部サービスエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `service` - サービス名
    /// * `message` - エラーメッセージ
    pub fn external_service<S: Into<String>>(service: S, message: S) -> Self {
        AppError::ExternalService(format!("{}: {}", service.into(), message.into()))
    }

    /// ステータス付きエラーを作成するヘルパー関数
    pub fn with_status<S: Into<String>>(status: u16, message: S) -> Self {
        AppError::Status {
            status,
            message: message.into(),
        }
    }

    /// データ破損エラーを作成するヘルパー関数
    pub fn data_corruption<S: Into<String>>(message: S) -> Self {
        AppError::DataCorruption(message.into())
    }

    /// 不正な状態エラーを作成するヘルパー関数
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        AppError::InvalidState(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// ローカルストレージエラーを作成するヘルパー関数
    pub fn storage<S: Into<String>>(message: S) -> Self {
        AppError::Storage(message.into())
    }
}

/// AppErrorからStringへの変換（ビュー層へ渡すため）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message()
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
