/// ナビゲーション機能モジュール
///
/// - 論理ルートとパスの対応
/// - 画面遷移のディスパッチ
/// - コントローラーからビュー層への通知インターフェース
pub mod router;
pub mod routes;
pub mod view;

pub use router::{Navigator, Router};
pub use routes::Route;
pub use view::{ReceiptOverlay, ViewPort};
