//! Input validation and sanitization.
//!
//! Defense-in-depth: validate all external inputs before processing.

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::types::LocalizedText;

/// Validation error types.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Input exceeds maximum allowed length.
    #[error("Input exceeds maximum length ({max} bytes, got {actual})")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual input length.
        actual: usize,
    },

    /// A required field was empty.
    #[error("Required field is empty: {0}")]
    EmptyField(&'static str),

    /// Price is missing, non-numeric, or negative.
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Bulk import payload is unusable as a whole.
    #[error("Invalid import payload: {0}")]
    InvalidImport(String),
}

/// Size limits per input type.
pub mod limits {
    /// Maximum name length (per language).
    pub const MAX_NAME_LENGTH: usize = 200;

    /// Maximum description length (per language).
    pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

    /// Maximum login length.
    pub const MAX_LOGIN_LENGTH: usize = 64;

    /// Maximum uploaded image size (5MB).
    pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

    /// Maximum bulk import payload size (1MB).
    pub const MAX_IMPORT_SIZE: usize = 1024 * 1024;

    /// Maximum rows accepted in one bulk import.
    pub const MAX_IMPORT_ROWS: usize = 500;
}

/// Validate and sanitize a user-supplied text value.
///
/// Performs:
/// 1. Length check (prevent memory exhaustion)
/// 2. Strip null bytes and control chars (except newlines/tabs)
/// 3. Unicode normalization (NFKC - prevent homograph confusion)
/// 4. Trim surrounding whitespace
///
/// # Errors
///
/// Returns `ValidationError::TooLong` if input exceeds `max_len`.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, ValidationError> {
    if input.len() > max_len {
        return Err(ValidationError::TooLong {
            max: max_len,
            actual: input.len(),
        });
    }

    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
        .collect();

    let normalized: String = sanitized.nfkc().collect();

    Ok(normalized.trim().to_string())
}

/// Parse a user-supplied price value.
///
/// # Errors
///
/// Returns `ValidationError::InvalidPrice` for non-numeric, non-finite, or
/// negative values.
pub fn parse_price(input: &str) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    let price: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidPrice(trimmed.to_string()))?;

    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError::InvalidPrice(trimmed.to_string()));
    }

    Ok(price)
}

/// One parsed menu row from a bulk import payload.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuRow {
    /// Item name.
    pub name: LocalizedText,
    /// Item description.
    pub description: LocalizedText,
    /// Item price.
    pub price: f64,
    /// Category name the row belongs to (matched or created by the caller).
    pub category: String,
}

/// A rejected import row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RowError {
    /// 1-based line number in the payload.
    pub line: usize,
    /// Why the row was rejected.
    pub reason: String,
}

/// Outcome of parsing a bulk import payload: usable rows plus per-row
/// rejections. A payload-level problem (too large, missing header) fails
/// the whole parse instead.
#[derive(Debug, Default)]
pub struct BulkImport {
    /// Rows that parsed cleanly.
    pub rows: Vec<MenuRow>,
    /// Rows that were rejected, with line numbers.
    pub errors: Vec<RowError>,
}

/// Expected CSV header for menu imports.
pub const IMPORT_HEADER: &str = "name_tm,name_ru,description_tm,description_ru,price,category";

/// Parse a CSV menu import payload.
///
/// Expected columns: `name_tm,name_ru,description_tm,description_ru,price,
/// category`. The first line must be the header. Quoted fields may contain
/// commas and doubled quotes. Bad rows are reported per line; they do not
/// abort the import.
///
/// # Errors
///
/// Returns `ValidationError::InvalidImport` if the payload is oversized,
/// empty, has a wrong header, or has too many rows.
pub fn parse_menu_import(input: &str) -> Result<BulkImport, ValidationError> {
    if input.len() > limits::MAX_IMPORT_SIZE {
        return Err(ValidationError::InvalidImport(format!(
            "payload exceeds {} bytes",
            limits::MAX_IMPORT_SIZE
        )));
    }

    let mut lines = input.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => {}
            Some((_, line)) => break line,
            None => {
                return Err(ValidationError::InvalidImport("empty payload".to_string()));
            }
        }
    };

    let normalized_header: String = header.split(',').map(str::trim).collect::<Vec<_>>().join(",");
    if !normalized_header.trim_start_matches('\u{feff}').eq_ignore_ascii_case(IMPORT_HEADER) {
        return Err(ValidationError::InvalidImport(format!(
            "expected header \"{IMPORT_HEADER}\""
        )));
    }

    let mut import = BulkImport::default();

    for (index, line) in lines {
        let line_no = index + 1;

        if line.trim().is_empty() {
            continue;
        }

        if import.rows.len() + import.errors.len() >= limits::MAX_IMPORT_ROWS {
            return Err(ValidationError::InvalidImport(format!(
                "more than {} rows",
                limits::MAX_IMPORT_ROWS
            )));
        }

        match parse_row(line) {
            Ok(row) => import.rows.push(row),
            Err(e) => import.errors.push(RowError {
                line: line_no,
                reason: e.to_string(),
            }),
        }
    }

    Ok(import)
}

fn parse_row(line: &str) -> Result<MenuRow, ValidationError> {
    let fields = split_csv_line(line);
    if fields.len() != 6 {
        return Err(ValidationError::InvalidImport(format!(
            "expected 6 columns, got {}",
            fields.len()
        )));
    }

    let name_tm = sanitize_text(&fields[0], limits::MAX_NAME_LENGTH)?;
    let name_ru = sanitize_text(&fields[1], limits::MAX_NAME_LENGTH)?;
    if name_tm.is_empty() && name_ru.is_empty() {
        return Err(ValidationError::EmptyField("name"));
    }

    let description_tm = sanitize_text(&fields[2], limits::MAX_DESCRIPTION_LENGTH)?;
    let description_ru = sanitize_text(&fields[3], limits::MAX_DESCRIPTION_LENGTH)?;
    let price = parse_price(&fields[4])?;

    let category = sanitize_text(&fields[5], limits::MAX_NAME_LENGTH)?;
    if category.is_empty() {
        return Err(ValidationError::EmptyField("category"));
    }

    Ok(MenuRow {
        name: LocalizedText::new(name_tm, name_ru, ""),
        description: LocalizedText::new(description_tm, description_ru, ""),
        price,
        category,
    })
}

/// Split one CSV line, honoring double-quoted fields with `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            _ => field.push(c),
        }
    }

    fields.push(field);
    fields
}
