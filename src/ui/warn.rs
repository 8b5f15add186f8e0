/// Print a standardized warning line to stderr (color-aware).
pub fn warn_print(msg: &str) {
    let use_err = crate::color_enabled_stderr();
    eprintln!(
        "{}",
        crate::paint(use_err, "\x1b[33;1m", &format!("dogi: warning: {}", msg))
    );
}

/// Print a boxed multi-line warning; the first line is highlighted.
pub fn warn_block(headline: &str, lines: &[&str]) {
    let use_err = crate::color_enabled_stderr();
    eprintln!(
        "{} ⚡⚡",
        crate::paint(use_err, crate::color::RED, &format!("WARNING: {headline}"))
    );
    for l in lines {
        eprintln!("{}", crate::paint(use_err, "\x1b[33m", l));
    }
}
