use serde::{Deserialize, Serialize};

/// 領収書プレビューのオーバーレイ表示内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptOverlay {
    /// 領収書画像のURL
    pub url: String,
    /// 画像の表示幅（オーバーレイ幅の半分）
    pub width: u32,
}

impl ReceiptOverlay {
    /// オーバーレイの幅から表示内容を作成する
    pub fn new(url: impl Into<String>, container_width: u32) -> Self {
        Self {
            url: url.into(),
            width: container_width / 2,
        }
    }
}

/// コントローラーがビュー層へ通知するためのインターフェース
pub trait ViewPort: Send + Sync {
    /// 領収書画像をオーバーレイで表示する
    fn show_receipt(&self, overlay: &ReceiptOverlay);

    /// 入力値のバリデーションエラーを表示する
    fn show_validation_error(&self, message: &str);

    /// ファイル入力欄をクリアする
    fn clear_file_input(&self);

    /// ストア通信などのエラーを表示する
    fn show_error(&self, message: &str);
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_width_is_half_of_container() {
        let overlay = ReceiptOverlay::new("https://test.storage.tld/receipt.jpg", 1511);
        assert_eq!(overlay.width, 755);
        assert_eq!(overlay.url, "https://test.storage.tld/receipt.jpg");
    }
}
