//! データ構造体モジュール
//!
//! ツールごとの選択状態・送信状態・オプションを保持する。
//! ブラウザAPIには触れないので、ネイティブの `cargo test` で検証できる。

use serde::Deserialize;
use std::rc::Rc;
use thiserror::Error;

use crate::utils::download::ObjectUrl;
use crate::utils::format::{has_extension, savings_percent};

/// 受け付けるファイル拡張子（大文字小文字は区別しない）
pub const ACCEPTED_EXTENSION: &str = ".pdf";

/// 単一ファイル送信時のフィールド名
pub const FILE_FIELD: &str = "file";

// ============================================
// ツール定義
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Convert,
    Compress,
    Ocr,
    Split,
    Unlock,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Convert,
        ToolKind::Compress,
        ToolKind::Ocr,
        ToolKind::Split,
        ToolKind::Unlock,
    ];

    /// DOM要素のid接頭辞
    pub fn id(self) -> &'static str {
        match self {
            ToolKind::Convert => "convert",
            ToolKind::Compress => "compress",
            ToolKind::Ocr => "ocr",
            ToolKind::Split => "split",
            ToolKind::Unlock => "unlock",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            ToolKind::Convert => "/api/convert",
            ToolKind::Compress => "/api/compress",
            ToolKind::Ocr => "/api/ocr",
            ToolKind::Split => "/api/split",
            ToolKind::Unlock => "/api/unlock",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ToolKind::Convert => "PDF to Word",
            ToolKind::Compress => "Compress PDF",
            ToolKind::Ocr => "OCR: Extract Text",
            ToolKind::Split => "Split PDF",
            ToolKind::Unlock => "Unlock PDF",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolKind::Convert => "Convert a PDF into an editable Word document.",
            ToolKind::Compress => "Reduce the file size of a PDF.",
            ToolKind::Ocr => "Recognise the text of a scanned PDF.",
            ToolKind::Split => "Split a PDF into single pages or a page range.",
            ToolKind::Unlock => "Remove the password from a protected PDF.",
        }
    }

    pub fn action_label(self) -> &'static str {
        match self {
            ToolKind::Convert => "Convert to Word",
            ToolKind::Compress => "Compress PDF",
            ToolKind::Ocr => "Extract Text",
            ToolKind::Split => "Split PDF",
            ToolKind::Unlock => "Unlock PDF",
        }
    }

    pub fn progress_message(self) -> &'static str {
        match self {
            ToolKind::Convert => "Converting...",
            ToolKind::Compress => "Compressing...",
            ToolKind::Ocr => "Extracting text...",
            ToolKind::Split => "Splitting...",
            ToolKind::Unlock => "Unlocking...",
        }
    }

    /// エラー本文にメッセージが無い場合の表示
    pub fn failure_message(self) -> &'static str {
        "Processing failed"
    }

    /// 成功レスポンスがJSONテキスト（OCR）かファイルか
    pub fn returns_text(self) -> bool {
        matches!(self, ToolKind::Ocr)
    }
}

/// マージツールの定数
pub mod merge {
    pub const ID: &str = "merge";
    pub const ENDPOINT: &str = "/api/merge";
    pub const FIELD: &str = "files";
    pub const PROGRESS_MESSAGE: &str = "Merging...";
    pub const FAILURE_MESSAGE: &str = "Merge failed";
    pub const MIN_FILES: usize = 2;
}

// ============================================
// ファイル選択
// ============================================

/// 選択済みファイル。ブラウザでは `H = web_sys::File`
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile<H> {
    pub name: String,
    pub size: u64,
    pub handle: H,
}

impl SelectedFile<web_sys::File> {
    pub fn from_file(file: web_sys::File) -> Self {
        Self {
            name: file.name(),
            size: file.size() as u64,
            handle: file,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("{name} is not a PDF file")]
    WrongExtension { name: String },
    #[error("{name} is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge { name: String, size: u64, limit: u64 },
    #[error("adding {name} would exceed the upload limit ({total} bytes in total, limit {limit} bytes)")]
    TotalTooLarge { name: String, total: u64, limit: u64 },
}

/// 拡張子とサイズ上限を確認
pub fn check_file<H>(file: &SelectedFile<H>, limit: u64) -> Result<(), SelectError> {
    if !has_extension(&file.name, ACCEPTED_EXTENSION) {
        return Err(SelectError::WrongExtension { name: file.name.clone() });
    }
    if file.size > limit {
        return Err(SelectError::TooLarge {
            name: file.name.clone(),
            size: file.size,
            limit,
        });
    }
    Ok(())
}

// ============================================
// 結果
// ============================================

/// 圧縮前後のサイズ（X-Original-Size / X-Compressed-Size）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeStats {
    pub original: u64,
    pub processed: u64,
}

impl SizeStats {
    /// 両方のヘッダーが揃って数値の場合のみ
    pub fn from_headers(original: Option<&str>, processed: Option<&str>) -> Option<Self> {
        let original = original?.trim().parse().ok()?;
        let processed = processed?.trim().parse().ok()?;
        Some(Self { original, processed })
    }

    pub fn saved_percent(&self) -> i64 {
        savings_percent(self.original, self.processed)
    }
}

/// ファイルを返すツールの成功結果
#[derive(Debug, Clone, PartialEq)]
pub struct FileResult {
    /// 結果が表示されている間だけ生存し、破棄時にrevokeされる
    pub url: Rc<ObjectUrl>,
    pub filename: String,
    pub stats: Option<SizeStats>,
}

/// OCRの成功結果 `{ text, page_count }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextResult {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub page_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelResult {
    File(FileResult),
    Text(TextResult),
    Error(String),
}

impl PanelResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, PanelResult::Error(_))
    }
}

// ============================================
// 送信状態
// ============================================

/// 送信ごとの番号。古い番号の完了通知は捨てる
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitState {
    in_flight: bool,
    ticket: u64,
    result: Option<PanelResult>,
}

impl SubmitState {
    fn begin(&mut self) -> Ticket {
        self.ticket += 1;
        self.in_flight = true;
        self.result = None;
        Ticket(self.ticket)
    }

    fn finish(&mut self, ticket: Ticket, result: Option<PanelResult>) -> bool {
        if !self.in_flight || ticket.0 != self.ticket {
            return false;
        }
        self.in_flight = false;
        self.result = result;
        true
    }

    /// 入力が変わった: 進行中の送信と結果を無効化
    fn invalidate(&mut self) {
        self.ticket += 1;
        self.in_flight = false;
        self.result = None;
    }

    fn succeeded(&self) -> bool {
        self.result.as_ref().is_some_and(PanelResult::is_success)
    }
}

// ============================================
// 単一ファイルツールのセッション
// ============================================

#[derive(Debug, Clone, PartialEq)]
pub struct ToolSession<H> {
    selected: Option<SelectedFile<H>>,
    submit: SubmitState,
}

impl<H> Default for ToolSession<H> {
    fn default() -> Self {
        Self {
            selected: None,
            submit: SubmitState::default(),
        }
    }
}

impl<H: Clone> ToolSession<H> {
    /// 拒否された場合は状態を変更しない
    pub fn select(&mut self, file: SelectedFile<H>, limit: u64) -> Result<(), SelectError> {
        check_file(&file, limit)?;
        self.selected = Some(file);
        self.submit.invalidate();
        Ok(())
    }

    pub fn remove(&mut self) {
        self.selected = None;
        self.submit.invalidate();
    }

    pub fn selected(&self) -> Option<&SelectedFile<H>> {
        self.selected.as_ref()
    }

    /// ファイル未選択または送信中なら `None`
    pub fn begin_submit(&mut self) -> Option<(Ticket, SelectedFile<H>)> {
        if self.submit.in_flight {
            return None;
        }
        let file = self.selected.clone()?;
        Some((self.submit.begin(), file))
    }

    /// `result` が `None` ならキャンセル扱い（送信ボタンだけ戻す）
    pub fn finish(&mut self, ticket: Ticket, result: Option<PanelResult>) -> bool {
        self.submit.finish(ticket, result)
    }

    pub fn in_flight(&self) -> bool {
        self.submit.in_flight
    }

    pub fn result(&self) -> Option<&PanelResult> {
        self.submit.result.as_ref()
    }

    pub fn show_drop_prompt(&self) -> bool {
        self.selected.is_none()
    }

    pub fn show_options(&self) -> bool {
        self.selected.is_some()
    }

    pub fn submit_visible(&self) -> bool {
        self.selected.is_some() && !self.submit.in_flight && !self.submit.succeeded()
    }
}

// ============================================
// マージのセッション
// ============================================

#[derive(Debug, Default, PartialEq, Eq)]
pub struct AddOutcome {
    pub accepted: usize,
    pub rejected: Vec<SelectError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeSession<H> {
    files: Vec<SelectedFile<H>>,
    submit: SubmitState,
}

impl<H> Default for MergeSession<H> {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            submit: SubmitState::default(),
        }
    }
}

impl<H: Clone> MergeSession<H> {
    /// 受け付けたファイルを到着順で末尾に追加。
    /// 上限は1リクエスト全体にかかるため、一覧の合計サイズで判定する
    pub fn add_files<I>(&mut self, files: I, limit: u64) -> AddOutcome
    where
        I: IntoIterator<Item = SelectedFile<H>>,
    {
        let mut outcome = AddOutcome::default();
        let mut total = self.total_size();
        for file in files {
            if let Err(e) = check_file(&file, limit) {
                outcome.rejected.push(e);
                continue;
            }
            let next = total.saturating_add(file.size);
            if next > limit {
                outcome.rejected.push(SelectError::TotalTooLarge {
                    name: file.name.clone(),
                    total: next,
                    limit,
                });
                continue;
            }
            total = next;
            self.files.push(file);
            outcome.accepted += 1;
        }
        if outcome.accepted > 0 {
            self.submit.invalidate();
        }
        outcome
    }

    pub fn remove_at(&mut self, index: usize) -> Option<SelectedFile<H>> {
        if index >= self.files.len() {
            return None;
        }
        let removed = self.files.remove(index);
        self.submit.invalidate();
        Some(removed)
    }

    pub fn clear_all(&mut self) {
        self.files.clear();
        self.submit.invalidate();
    }

    pub fn files(&self) -> &[SelectedFile<H>] {
        &self.files
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// 2ファイル未満または送信中なら `None`
    pub fn begin_submit(&mut self) -> Option<(Ticket, Vec<SelectedFile<H>>)> {
        if self.submit.in_flight || self.files.len() < merge::MIN_FILES {
            return None;
        }
        Some((self.submit.begin(), self.files.clone()))
    }

    pub fn finish(&mut self, ticket: Ticket, result: Option<PanelResult>) -> bool {
        self.submit.finish(ticket, result)
    }

    pub fn in_flight(&self) -> bool {
        self.submit.in_flight
    }

    pub fn result(&self) -> Option<&PanelResult> {
        self.submit.result.as_ref()
    }

    pub fn show_drop_prompt(&self) -> bool {
        self.files.is_empty()
    }

    pub fn submit_visible(&self) -> bool {
        self.files.len() >= merge::MIN_FILES && !self.submit.in_flight && !self.submit.succeeded()
    }
}

// ============================================
// ツール別オプション
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl CompressQuality {
    pub const ALL: [CompressQuality; 3] = [CompressQuality::Low, CompressQuality::Medium, CompressQuality::High];

    pub fn as_str(self) -> &'static str {
        match self {
            CompressQuality::Low => "low",
            CompressQuality::Medium => "medium",
            CompressQuality::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompressQuality::Low => "Extreme compression",
            CompressQuality::Medium => "Recommended",
            CompressQuality::High => "Less compression",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    #[default]
    All,
    Range,
}

impl SplitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SplitMode::All => "all",
            SplitMode::Range => "range",
        }
    }
}

pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// Tesseractの言語コードと表示名
pub const OCR_LANGUAGES: &[(&str, &str)] = &[
    ("eng", "English"),
    ("deu", "German"),
    ("fra", "French"),
    ("spa", "Spanish"),
    ("ita", "Italian"),
    ("por", "Portuguese"),
    ("nld", "Dutch"),
    ("jpn", "Japanese"),
    ("chi_sim", "Chinese (Simplified)"),
];

/// 送信時に読み取るフォームの値
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOptions {
    pub quality: CompressQuality,
    pub language: String,
    pub split_mode: SplitMode,
    pub pages: String,
    pub password: String,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            quality: CompressQuality::default(),
            language: DEFAULT_OCR_LANGUAGE.to_string(),
            split_mode: SplitMode::default(),
            pages: String::new(),
            password: String::new(),
        }
    }
}

impl ToolOptions {
    /// ツールに応じた追加フィールド
    pub fn form_fields(&self, kind: ToolKind) -> Vec<(&'static str, String)> {
        match kind {
            ToolKind::Convert => Vec::new(),
            ToolKind::Compress => vec![("quality", self.quality.as_str().to_string())],
            ToolKind::Ocr => vec![("language", self.language.clone())],
            ToolKind::Split => vec![
                ("mode", self.split_mode.as_str().to_string()),
                ("pages", self.pages.clone()),
            ],
            ToolKind::Unlock => vec![("password", self.password.clone())],
        }
    }
}
