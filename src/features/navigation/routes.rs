use serde::{Deserialize, Serialize};

/// 論理ルート
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// ログイン画面
    Login,
    /// 請求書一覧
    Bills,
    /// 請求書の新規作成
    NewBill,
}

impl Route {
    /// ルートに対応するパス
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Bills => "#employee/bills",
            Route::NewBill => "#employee/bill/new",
        }
    }

    /// パスからルートを解決する（不明なパスはログイン画面）
    pub fn from_path(path: &str) -> Self {
        match path.trim() {
            "#employee/bills" => Route::Bills,
            "#employee/bill/new" => Route::NewBill,
            _ => Route::Login,
        }
    }

    /// 縦型レイアウトで強調表示するアイコンのtest id
    pub fn highlighted_icon(&self) -> Option<&'static str> {
        match self {
            Route::Login => None,
            Route::Bills => Some("icon-window"),
            Route::NewBill => Some("icon-mail"),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
