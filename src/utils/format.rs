//! 表示用フォーマット

/// Content-Dispositionからファイル名を取れない場合の名前
pub const FALLBACK_FILENAME: &str = "download";

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// バイト数を "1.5 KB" のような文字列に変換
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    // 小数第1位の端数0.5は切り上げ
    let value = (value * 10.0).round() / 10.0;
    format!("{:.1} {}", value, SIZE_UNITS[unit])
}

/// 削減率（%）。元サイズ0なら0
pub fn savings_percent(original: u64, processed: u64) -> i64 {
    if original == 0 {
        return 0;
    }
    let ratio = 1.0 - processed as f64 / original as f64;
    // 0.5は切り上げ（負の値も含めて）
    (ratio * 100.0 + 0.5).floor() as i64
}

pub fn has_extension(name: &str, extension: &str) -> bool {
    name.to_lowercase().ends_with(&extension.to_lowercase())
}

/// `filename="?([^";]+)"?` に相当する抽出
pub fn filename_from_disposition(header: Option<&str>) -> Option<String> {
    const KEY: &str = "filename=";
    let mut rest = header?;
    while let Some(pos) = rest.find(KEY) {
        let after = &rest[pos + KEY.len()..];
        let value = after.strip_prefix('"').unwrap_or(after);
        let name: String = value.chars().take_while(|c| *c != '"' && *c != ';').collect();
        if !name.is_empty() {
            return Some(name);
        }
        rest = after;
    }
    None
}

/// "3 pages" / "1 page"
pub fn pages_label(count: u32) -> String {
    format!("{} page{}", count, if count > 1 { "s" } else { "" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512.0 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_048_576), "1.0 MB");
        // ちょうど .x5 になるサイズ
        assert_eq!(format_size(1280), "1.3 KB");
        assert_eq!(format_size(3328), "3.3 KB");
        assert_eq!(format_size(1_310_720), "1.3 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
        // GBより上の単位は無い
        assert_eq!(format_size(2048 * 1024 * 1024 * 1024), "2048.0 GB");
    }

    #[test]
    fn test_savings_percent() {
        assert_eq!(savings_percent(1000, 400), 60);
        assert_eq!(savings_percent(0, 400), 0);
        assert_eq!(savings_percent(1000, 1000), 0);
        assert_eq!(savings_percent(3, 2), 33);
        assert_eq!(savings_percent(1000, 1500), -50);
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("a.pdf", ".pdf"));
        assert!(has_extension("A.PdF", ".pdf"));
        assert!(!has_extension("a.pdf.exe", ".pdf"));
        assert!(!has_extension("pdf", ".pdf"));
    }

    #[test]
    fn test_filename_from_disposition() {
        assert_eq!(
            filename_from_disposition(Some("attachment; filename=\"report.docx\"")).as_deref(),
            Some("report.docx")
        );
        assert_eq!(
            filename_from_disposition(Some("attachment; filename=compressed_a.pdf; size=10")).as_deref(),
            Some("compressed_a.pdf")
        );
        assert_eq!(filename_from_disposition(Some("attachment")), None);
        assert_eq!(filename_from_disposition(Some("attachment; filename=\"\"")), None);
        assert_eq!(filename_from_disposition(None), None);
    }

    #[test]
    fn test_pages_label() {
        assert_eq!(pages_label(1), "1 page");
        assert_eq!(pages_label(0), "0 page");
        assert_eq!(pages_label(12), "12 pages");
    }
}
