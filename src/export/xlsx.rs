// src/export/xlsx.rs

use crate::errors::{AppError, AppResult};
use crate::export::excel_date::{DATE_FORMAT, excel_serial};
use crate::export::model::{CellKind, ExportRecord};
use crate::export::notify_export_success;
use crate::ui::messages::info;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

const HEADER_BG: Color = Color::RGB(0x2F75B5);
const BANDS: [Color; 2] = [Color::RGB(0xEAF3FB), Color::RGB(0xFFFFFF)];

/// One sheet per export: frozen header row, banded body, cells typed by the
/// record's column kinds, widths fitted to content.
pub(crate) fn export_xlsx<T: ExportRecord>(records: &[T], path: &Path, sheet: &str) -> AppResult<()> {
    info(format!("Exporting to XLSX: {}", path.display()));

    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.set_name(sheet).map_err(to_export_error)?;

    if records.is_empty() {
        ws.write(0, 0, "No data available").map_err(to_export_error)?;
        workbook.save(path_str(path)?).map_err(to_export_error)?;
        notify_export_success("XLSX (empty dataset)", path);
        return Ok(());
    }

    let headers = T::headers();
    let kinds = T::kinds();

    let header_fmt = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(HEADER_BG)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);
    ws.write_row_with_format(0, 0, headers.iter().copied(), &header_fmt)
        .map_err(to_export_error)?;
    ws.set_freeze_panes(1, 0).map_err(to_export_error)?;

    // Two formats per kind, one per band.
    let formats: Vec<[Format; 2]> = kinds
        .iter()
        .map(|k| BANDS.map(|bg| body_format(*k, bg)))
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, value) in record.to_row().iter().enumerate() {
            write_cell(ws, row, col as u16, kinds[col], value, &formats[col][i % 2])?;
            widths[col] = widths[col].max(value.width());
        }
    }

    for (col, w) in widths.iter().enumerate() {
        ws.set_column_width(col as u16, (*w + 2) as f64)
            .map_err(to_export_error)?;
    }

    workbook.save(path_str(path)?).map_err(to_export_error)?;
    notify_export_success("XLSX", path);
    Ok(())
}

fn body_format(kind: CellKind, bg: Color) -> Format {
    let base = Format::new()
        .set_background_color(bg)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);
    match kind {
        CellKind::Date => base.set_num_format(DATE_FORMAT),
        CellKind::Integer => base.set_align(FormatAlign::Right),
        CellKind::Flag => base.set_align(FormatAlign::Center),
        CellKind::Text => base,
    }
}

/// A value that does not parse as its column kind falls back to text.
fn write_cell(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    kind: CellKind,
    value: &str,
    fmt: &Format,
) -> AppResult<()> {
    let typed = match kind {
        CellKind::Date => excel_serial(value)
            .map(|n| ws.write_number_with_format(row, col, n, fmt).map(|_| ())),
        CellKind::Integer => value
            .parse::<i64>()
            .ok()
            .map(|n| ws.write_number_with_format(row, col, n as f64, fmt).map(|_| ())),
        CellKind::Flag => value
            .parse::<bool>()
            .ok()
            .map(|b| ws.write_boolean_with_format(row, col, b, fmt).map(|_| ())),
        CellKind::Text => None,
    };

    match typed {
        Some(res) => res.map_err(to_export_error),
        None => ws
            .write_string_with_format(row, col, value, fmt)
            .map(|_| ())
            .map_err(to_export_error),
    }
}

fn to_export_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(e.to_string())
}

fn path_str(path: &Path) -> AppResult<&str> {
    path.to_str()
        .ok_or_else(|| AppError::Export(format!("invalid path: {}", path.display())))
}
