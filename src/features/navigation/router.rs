use super::routes::Route;
use std::sync::Mutex;

/// 論理ルートへ画面を切り替える
pub trait Navigator: Send + Sync {
    /// 指定したルートへ遷移する
    fn navigate(&self, route: Route);
}

/// 現在のルートと遷移履歴を保持するナビゲーター
pub struct Router {
    history: Mutex<Vec<Route>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Route::Login)
    }
}

impl Router {
    /// 初期ルートを指定して作成する
    pub fn new(initial: Route) -> Self {
        Self {
            history: Mutex::new(vec![initial]),
        }
    }

    /// 現在のルート
    pub fn current(&self) -> Route {
        self.history
            .lock()
            .map(|history| history.last().copied().unwrap_or(Route::Login))
            .unwrap_or_else(|poisoned| {
                poisoned
                    .into_inner()
                    .last()
                    .copied()
                    .unwrap_or(Route::Login)
            })
    }

    /// 初期ルートを含む遷移履歴
    pub fn history(&self) -> Vec<Route> {
        match self.history.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Navigator for Router {
    fn navigate(&self, route: Route) {
        log::info!("画面遷移: {} -> {route}", self.current());
        match self.history.lock() {
            Ok(mut history) => history.push(route),
            Err(poisoned) => poisoned.into_inner().push(route),
        }
    }
}
