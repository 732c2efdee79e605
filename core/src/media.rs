//! Helpers for uploaded media.

/// Human-readable size: KB below one mebibyte, MB from there on.
pub fn format_bytes(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes < MIB {
        format!("{:.2} KB", round_half_up(bytes as f64 / 1024.0))
    } else {
        format!("{:.2} MB", round_half_up(bytes as f64 / MIB as f64))
    }
}

/// Round to two decimals with ties going up; `{:.2}` alone rounds them to even.
fn round_half_up(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Path of the thumbnail the backend stores next to an uploaded image.
pub fn thumbnail_path(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/thumb_{file}"),
        None => format!("thumb_{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_kilobytes_below_one_mebibyte() {
        assert_eq!(format_bytes(0), "0.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024 - 1), "1024.00 KB");
    }

    #[test]
    fn ties_round_up() {
        // 128 B is exactly 0.125 KB.
        assert_eq!(format_bytes(128), "0.13 KB");
        // 1.125 MiB.
        assert_eq!(format_bytes(1024 * 1024 + 128 * 1024), "1.13 MB");
    }

    #[test]
    fn formats_megabytes_from_one_mebibyte() {
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 512 * 1024), "5.50 MB");
    }

    #[test]
    fn thumbnail_prefixes_file_name() {
        assert_eq!(thumbnail_path("/uploads/2024/logo.png"), "/uploads/2024/thumb_logo.png");
        assert_eq!(thumbnail_path("logo.png"), "thumb_logo.png");
    }
}
