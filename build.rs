use std::env;

fn main() {
    // ビルド時に環境変数を設定
    // 実行時の環境変数が優先され、ここで埋め込んだ値はフォールバックとして使われる

    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    println!("cargo:rustc-env=ENVIRONMENT={}", environment);

    // API設定
    let api_server_url =
        env::var("API_SERVER_URL").unwrap_or_else(|_| "http://localhost:5678".to_string());

    let api_timeout = env::var("API_TIMEOUT_SECONDS").unwrap_or_else(|_| "30".to_string());
    let api_max_retries = env::var("API_MAX_RETRIES").unwrap_or_else(|_| "3".to_string());

    println!("cargo:rustc-env=API_SERVER_URL={}", api_server_url);
    println!("cargo:rustc-env=API_TIMEOUT_SECONDS={}", api_timeout);
    println!("cargo:rustc-env=API_MAX_RETRIES={}", api_max_retries);

    // 領収書として受け付けるメディアタイプ
    let allowed_receipt_types = env::var("ALLOWED_RECEIPT_TYPES")
        .unwrap_or_else(|_| "image/jpg,image/jpeg,image/png".to_string());
    println!(
        "cargo:rustc-env=ALLOWED_RECEIPT_TYPES={}",
        allowed_receipt_types
    );

    // ログレベル
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    println!("cargo:rustc-env=LOG_LEVEL={}", log_level);

    println!("cargo:rerun-if-env-changed=ENVIRONMENT");
    println!("cargo:rerun-if-env-changed=API_SERVER_URL");
    println!("cargo:rerun-if-env-changed=ALLOWED_RECEIPT_TYPES");

    // ビルド情報を出力
    println!("cargo:warning=ビルド環境: {}", environment);
    println!("cargo:warning=APIサーバーURL: {}", api_server_url);
}
