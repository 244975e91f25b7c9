use crate::shared::errors::{AppError, AppResult};
use std::path::PathBuf;
use url::Url;

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 環境変数取得エラー
#[derive(Debug, Clone)]
pub struct EnvVarError {
    /// 変数名
    pub var_name: String,
    /// エラーメッセージ
    pub message: String,
}

impl std::fmt::Display for EnvVarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "環境変数 {} が見つかりません: {}",
            self.var_name, self.message
        )
    }
}

impl std::error::Error for EnvVarError {}

/// 環境変数を取得する（優先順位: 起動時 > コンパイル時 > エラー）
///
/// # 取得順序
/// 1. 起動時の環境変数（`std::env::var`）
/// 2. コンパイル時の環境変数（`option_env!`マクロ、`build.rs` が埋め込む）
/// 3. どちらも見つからない場合はエラー
#[macro_export]
macro_rules! get_env_var {
    ($var_name:expr) => {{
        // 1. 起動時の環境変数を確認
        if let Ok(value) = std::env::var($var_name) {
            log::debug!("環境変数 {} を起動時の環境変数から取得しました", $var_name);
            Ok(value)
        }
        // 2. コンパイル時の環境変数を確認
        else if let Some(value) = option_env!($var_name) {
            log::debug!("環境変数 {} をコンパイル時の環境変数から取得しました", $var_name);
            Ok(value.to_string())
        }
        // 3. どちらも見つからない場合はエラー
        else {
            Err($crate::shared::config::environment::EnvVarError {
                var_name: $var_name.to_string(),
                message: format!(
                    "起動時の環境変数 {} もコンパイル時の環境変数も見つかりませんでした",
                    $var_name
                ),
            })
        }
    }};
}

/// 環境変数を取得する（デフォルト値付き）
#[macro_export]
macro_rules! get_env_var_or_default {
    ($var_name:expr, $default_value:expr) => {{
        $crate::get_env_var!($var_name).unwrap_or_else(|_| {
            log::debug!(
                "環境変数 {} が見つからないため、デフォルト値を使用します: {}",
                $var_name,
                $default_value
            );
            $default_value.to_string()
        })
    }};
}

/// 環境設定を管理する構造体
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: String,
    /// ログレベル
    pub log_level: String,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        let environment = get_environment();
        let debug_mode = environment == Environment::Development;
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if debug_mode {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

        Self {
            environment: format!("{environment:?}").to_lowercase(),
            log_level,
        }
    }

    /// ログレベル文字列を `log::LevelFilter` に変換する
    ///
    /// 不明な値は `Info` として扱う。
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}

/// 現在の実行環境を判定する
///
/// # 判定ロジック
/// 1. 実行時環境変数 ENVIRONMENT を確認
/// 2. デバッグビルドの場合は Development
/// 3. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = match env_var.as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    // フォールバック: ビルド設定に基づく判定
    let env = if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    };
    log::debug!(
        "環境判定: ビルド設定を使用 -> debug_assertions={} -> {env:?}",
        cfg!(debug_assertions)
    );
    env
}

/// 開発ビルドの場合のみ.envファイルを読み込む
///
/// 本番ビルドでは環境変数は実行時に設定されることを前提とする。
pub fn load_environment_variables() {
    if cfg!(debug_assertions) {
        match dotenv::dotenv() {
            Ok(path) => {
                log::debug!("環境ファイルを読み込みました: {}", path.display());
            }
            Err(e) => {
                log::debug!("環境ファイルの読み込みをスキップしました: {e}");
            }
        }
    }
}

/// ログシステムを初期化する
///
/// 既に初期化済みの場合は何もしない。
pub fn initialize_logging_system() {
    let env_config = EnvironmentConfig::from_env();

    let initialized = env_logger::Builder::from_default_env()
        .filter_level(env_config.level_filter())
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init()
        .is_ok();

    if initialized {
        log::info!(
            "ログシステムを初期化しました: level={}, environment={}",
            env_config.log_level,
            env_config.environment
        );
    }
}

/// API設定を管理する構造体
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// APIサーバーのベースURL
    pub base_url: String,
    /// APIリクエストのタイムアウト（秒）
    pub timeout_seconds: u64,
    /// 接続失敗時の最大リトライ回数
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5678".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
        }
    }
}

impl ApiConfig {
    /// 環境変数からAPI設定を読み込む
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = crate::get_env_var_or_default!("API_SERVER_URL", defaults.base_url);

        let timeout_seconds = crate::get_env_var_or_default!("API_TIMEOUT_SECONDS", "30")
            .parse()
            .unwrap_or_else(|_| {
                log::warn!(
                    "API_TIMEOUT_SECONDSのパースに失敗しました。デフォルト値30秒を使用します"
                );
                defaults.timeout_seconds
            });

        let max_retries = crate::get_env_var_or_default!("API_MAX_RETRIES", "3")
            .parse()
            .unwrap_or_else(|_| {
                log::warn!("API_MAX_RETRIESのパースに失敗しました。デフォルト値3回を使用します");
                defaults.max_retries
            });

        log::info!(
            "API設定: base_url={base_url}, timeout={timeout_seconds}s, max_retries={max_retries}"
        );

        Self {
            base_url,
            timeout_seconds,
            max_retries,
        }
    }

    /// 設定を検証する
    pub fn validate(&self) -> AppResult<()> {
        if self.base_url.is_empty() {
            return Err(AppError::configuration(
                "APIサーバーのベースURLが設定されていません",
            ));
        }

        Url::parse(&self.base_url).map_err(|e| {
            AppError::configuration(format!("APIサーバーのベースURLが不正です: {e}"))
        })?;

        if self.timeout_seconds == 0 {
            return Err(AppError::configuration(
                "APIタイムアウトは0より大きい値である必要があります",
            ));
        }

        Ok(())
    }
}

/// 領収書ファイルの受け入れポリシー
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptPolicy {
    /// 受け付けるメディアタイプ（小文字）
    pub allowed_types: Vec<String>,
    /// 最大ファイルサイズ（バイト）
    pub max_file_size: u64,
}

/// 領収書として受け付けるデフォルトのメディアタイプ
pub const DEFAULT_RECEIPT_TYPES: [&str; 3] = ["image/jpg", "image/jpeg", "image/png"];

/// 領収書ファイルのデフォルト最大サイズ（10MB）
pub const DEFAULT_MAX_RECEIPT_SIZE: u64 = 10 * 1024 * 1024;

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            allowed_types: DEFAULT_RECEIPT_TYPES.iter().map(|t| t.to_string()).collect(),
            max_file_size: DEFAULT_MAX_RECEIPT_SIZE,
        }
    }
}

impl ReceiptPolicy {
    /// カンマ区切りのリストからポリシーを作成する
    ///
    /// 空の要素は無視し、すべて小文字に正規化する。
    /// 有効な要素が一つもない場合はデフォルトのリストを使う。
    pub fn from_list(list: &str, max_file_size: u64) -> Self {
        let allowed_types: Vec<String> = list
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        if allowed_types.is_empty() {
            log::warn!("領収書のメディアタイプが空です。デフォルトを使用します");
            return Self {
                max_file_size,
                ..Self::default()
            };
        }

        Self {
            allowed_types,
            max_file_size,
        }
    }

    /// 環境変数からポリシーを読み込む
    pub fn from_env() -> Self {
        let list = crate::get_env_var_or_default!(
            "ALLOWED_RECEIPT_TYPES",
            DEFAULT_RECEIPT_TYPES.join(",")
        );
        let max_file_size = std::env::var("MAX_RECEIPT_SIZE_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_RECEIPT_SIZE);

        Self::from_list(&list, max_file_size)
    }

    /// メディアタイプが許可リストに含まれるかを判定する
    ///
    /// 大文字小文字は区別せず、`;` 以降のパラメータは無視する。
    pub fn allows(&self, media_type: &str) -> bool {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        !essence.is_empty() && self.allowed_types.iter().any(|t| *t == essence)
    }
}

/// ストアゲートウェイのバックエンド種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// REST APIサーバー
    Rest,
    /// プロセス内のメモリストア
    Memory,
}

impl StoreBackend {
    /// 環境変数 STORE_BACKEND から読み込む（不明な値は Rest）
    pub fn from_env() -> Self {
        match std::env::var("STORE_BACKEND")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            _ => StoreBackend::Rest,
        }
    }
}

/// ローカルストレージファイルのパスを取得する
///
/// LOCAL_STORAGE_PATH が設定されていればそれを使い、
/// なければユーザーデータディレクトリ配下に置く。
pub fn local_storage_path() -> AppResult<PathBuf> {
    if let Ok(path) = std::env::var("LOCAL_STORAGE_PATH") {
        return Ok(PathBuf::from(path));
    }

    let data_dir = dirs::data_dir().ok_or_else(|| {
        AppError::configuration("ユーザーデータディレクトリを特定できませんでした")
    })?;

    Ok(data_dir.join("billed").join("local_storage.json"))
}
