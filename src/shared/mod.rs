/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有設定管理
pub mod config;

/// ストアゲートウェイ用のHTTPクライアント
pub mod api_client;

/// 共有ユーティリティ関数
pub mod utils;

// 便利な再エクスポート
pub use config::{
    get_environment, initialize_application, initialize_logging_system,
    load_environment_variables, log_initialization_complete, ApiConfig, Environment,
    EnvironmentConfig, InitializationResult, ReceiptPolicy, StoreBackend,
};
pub use errors::{AppError, AppResult, ErrorSeverity};
