/// セッション機能モジュール
///
/// ログイン時に保存された資格情報をローカルストレージから読み取り、
/// 読み取り専用のセッション情報として各コントローラーに渡します。
pub mod context;
pub mod local_storage;

pub use context::{SessionContext, StoredUser};
pub use local_storage::{FileStorage, LocalStorage, MemoryStorage, StorageKeys};
