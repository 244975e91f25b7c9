use nanoid::nanoid;

/// 請求書ID用のnanoIdを生成する
///
/// # 戻り値
/// 21文字のURL-safeなnanoId
pub fn generate_bill_id() -> String {
    nanoid!()
}

/// 領収書ファイルのキーを生成する
///
/// # 引数
/// * `length` - 生成するキーの長さ
pub fn generate_file_key(length: usize) -> String {
    nanoid!(length)
}
