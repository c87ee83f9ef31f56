use rand::Rng;

pub const REDEMPTION_CODE_LEN: usize = 8;
const REDEMPTION_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 生成8位字母数字组合的兑换码（不保证唯一, 由调用方查重）
pub fn generate_redemption_code() -> String {
    let mut rng = rand::thread_rng();
    (0..REDEMPTION_CODE_LEN)
        .map(|_| REDEMPTION_CODE_CHARSET[rng.gen_range(0..REDEMPTION_CODE_CHARSET.len())] as char)
        .collect()
}

pub fn is_redemption_code_format(code: &str) -> bool {
    code.len() == REDEMPTION_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
