pub fn set_panic_hook() {
    // When the `console_error_panic_hook` feature is enabled, we can call the
    // `set_panic_hook` function at least once during initialization, and then
    // we will get better error messages if our code ever panics.
    //
    // For more details see
    // https://github.com/rustwasm/console_error_panic_hook#readme
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Upload path for a spot photo: epoch millis, a random base36 token, and
/// the original file's extension. Two submissions in the same millisecond
/// still get distinct paths.
pub(crate) fn image_upload_path(now_ms: f64, random: f64, original_name: &str) -> String {
    let extension = original_name.rsplit('.').next().unwrap_or("jpg");
    format!("{}_{}.{extension}", now_ms as u64, base36_token(random))
}

/// The `Math.random().toString(36).substring(2)` trick, for parity with the
/// paths already in the storage bucket.
fn base36_token(random: f64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut fraction = random.abs().fract();
    let mut token = String::new();
    for _ in 0..11 {
        fraction *= 36.0;
        let digit = (fraction as usize) % 36;
        token.push(DIGITS[digit] as char);
        fraction = fraction.fract();
        if fraction == 0.0 {
            break;
        }
    }
    if token.is_empty() {
        token.push('0');
    }
    token
}
