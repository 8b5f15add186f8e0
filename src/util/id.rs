use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn base36(mut v: u64) -> String {
    let mut s = String::new();
    if v == 0 {
        s.push('0');
    }
    while v > 0 {
        s.push(ALPHABET[(v % 36) as usize] as char);
        v /= 36;
    }
    s.chars().rev().collect()
}

/// Short random token for temp file names.
pub fn random_suffix() -> String {
    let mut buf = [0u8; 8];
    let raw = match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(_) => {
            // Compose from time and pid when the OS RNG is unavailable
            let nanos = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_else(|_| Duration::from_secs(0))
                .as_nanos();
            (nanos ^ u128::from(std::process::id())) as u64
        }
    };
    // 50 bits are plenty and keep names short
    base36(raw & 0x3_ffff_ffff_ffff)
}

/// Host path for a new container-id marker (`<tmp>/.dogi<random>.cid`).
///
/// The file must not exist yet: `docker create --cidfile` refuses to overwrite.
pub fn cid_file_path(tmp: &Path) -> PathBuf {
    tmp.join(format!(".{}{}.cid", crate::APP_NAME, random_suffix()))
}
