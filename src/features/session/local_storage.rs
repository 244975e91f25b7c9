//! ローカルストレージモジュール
//!
//! ログイン時に保存されたユーザー情報やトークンを文字列のキー・バリューとして
//! 読み書きします。ブラウザの localStorage と同じく、値はすべて文字列です。

use crate::shared::errors::{AppError, AppResult};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// ローカルストレージのキー定義
pub struct StorageKeys;

impl StorageKeys {
    /// シリアライズ済みユーザー情報（`{type, email}`）のキー
    pub const USER: &'static str = "user";
    /// 認証トークンのキー
    pub const JWT: &'static str = "jwt";
}

/// 同期的なキー・バリューストア
pub trait LocalStorage: Send + Sync {
    /// 値を取得する（存在しない場合はNone）
    fn get_item(&self, key: &str) -> AppResult<Option<String>>;

    /// 値を保存する
    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;

    /// 値を削除する
    fn remove_item(&self, key: &str) -> AppResult<()>;
}

/// メモリ上のローカルストレージ
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// 空のストレージを作成する
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|e| AppError::storage(format!("ストレージロック取得エラー: {e}")))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| AppError::storage(format!("ストレージロック取得エラー: {e}")))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| AppError::storage(format!("ストレージロック取得エラー: {e}")))?;
        items.remove(key);
        Ok(())
    }
}

/// JSONファイルに保存するローカルストレージ
///
/// ファイルは最初の書き込み時に作成される。書き込みは一時ファイル経由で置き換える。
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// 新しいFileStorageを作成する
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// 保存先のパス
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> AppResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            AppError::storage(format!(
                "ストレージファイルの解析に失敗しました: path={:?}, error={e}",
                self.path
            ))
        })
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(items)?)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> AppResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| AppError::storage(format!("ストレージロック取得エラー: {e}")))?;
        let mut items = self.read_all()?;
        f(&mut items);
        self.write_all(&items)
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| AppError::storage(format!("ストレージロック取得エラー: {e}")))?;
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
        })?;
        log::debug!("ローカルストレージに保存しました: key={key}");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        self.update(|items| {
            items.remove(key);
        })?;
        log::debug!("ローカルストレージから削除しました: key={key}");
        Ok(())
    }
}
