use crate::shared::config::environment::{get_environment, local_storage_path, Environment};
use crate::shared::errors::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// アプリケーション初期化の結果を表す構造体
#[derive(Debug)]
pub struct InitializationResult {
    /// 初回起動かどうか
    pub is_first_run: bool,
    /// ローカルストレージファイルのパス
    pub storage_path: PathBuf,
    /// 実行環境
    pub environment: Environment,
}

/// アプリケーションの初期化を実行する
///
/// # 処理内容
/// 1. ローカルストレージファイルのパスを決定
/// 2. 親ディレクトリの作成
/// 3. 初回起動の判定（ストレージファイルの有無）
pub fn initialize_application() -> AppResult<InitializationResult> {
    let environment = get_environment();
    let storage_path = local_storage_path()?;
    initialize_at(environment, storage_path)
}

/// 指定したストレージパスで初期化を実行する
pub fn initialize_at(
    environment: Environment,
    storage_path: PathBuf,
) -> AppResult<InitializationResult> {
    if let Some(parent) = storage_path.parent() {
        ensure_directory(parent)?;
    }

    let is_first_run = !storage_path.exists();

    if is_first_run {
        log::info!("=== アプリケーション初回起動 ===");
        log::info!("実行環境: {environment:?}");
        log::info!("ローカルストレージ: {storage_path:?}");
    }

    Ok(InitializationResult {
        is_first_run,
        storage_path,
        environment,
    })
}

/// ディレクトリを確実に作成する
fn ensure_directory(dir: &Path) -> AppResult<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| {
        AppError::configuration(format!("データディレクトリの作成に失敗: {e}"))
    })?;

    log::info!("データディレクトリを作成しました: {dir:?}");
    Ok(())
}

/// 初期化完了ログを出力する
pub fn log_initialization_complete(result: &InitializationResult) {
    if result.is_first_run {
        log::info!("初回起動の初期化が正常に完了しました");
    } else {
        log::info!("アプリケーション起動完了（既存のローカルストレージを使用）");
    }
    log::info!("環境: {:?}", result.environment);
}
