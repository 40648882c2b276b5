//! Minimal Office Open XML worksheet reader.
//!
//! Only what the base table needs: workbook sheet lookup, shared strings and
//! the cell values of one worksheet. Styles and number formats are ignored,
//! so dates come through as their serial numbers.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use super::error::LoadError;
use super::model::{Cell, RawTable};

/// Read worksheet `sheet` into a [`RawTable`]; the first row present is the header.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<RawTable, LoadError> {
    let mut zip = ZipArchive::new(File::open(path)?)?;

    let relationships = read_relationships(&mut zip)?;
    let sheets = read_workbook(&mut zip)?;
    let target = sheets
        .iter()
        .find(|(name, _)| name == sheet)
        .and_then(|(_, id)| relationships.get(id))
        .ok_or_else(|| LoadError::MissingSheet {
            sheet: sheet.to_string(),
            available: sheets.iter().map(|(name, _)| name.clone()).collect(),
        })?;
    let part = resolve_target(target);

    let shared = read_shared_strings(&mut zip)?;
    let xml = read_part(&mut zip, &part)?
        .ok_or_else(|| LoadError::Malformed(format!("worksheet part '{part}' is missing")))?;

    let mut rows = read_rows(&xml, &shared)?.into_iter();
    let headers = rows
        .next()
        .map(|cells| {
            cells
                .iter()
                .enumerate()
                .map(|(i, c)| c.as_text().unwrap_or_else(|| format!("Unnamed: {i}")))
                .collect()
        })
        .unwrap_or_default();

    Ok(RawTable {
        headers,
        rows: rows.collect(),
    })
}

// ---------------------------------------------------------------------------
// Package parts
// ---------------------------------------------------------------------------

/// Read a part by name (case-insensitive, `\` tolerated); `None` when absent.
fn read_part<R: Read + Seek>(zip: &mut ZipArchive<R>, name: &str) -> Result<Option<String>, LoadError> {
    let pattern = name.replace('\\', "/");
    let Some(found) = zip
        .file_names()
        .find(|n| n.replace('\\', "/").eq_ignore_ascii_case(&pattern))
        .map(str::to_owned)
    else {
        return Ok(None);
    };
    match zip.by_name(&found) {
        Ok(mut file) => {
            let mut text = String::new();
            file.read_to_string(&mut text)?;
            Ok(Some(text))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Workbook relationship targets are relative to `xl/` unless absolute.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

fn xml_reader(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    let config = reader.config_mut();
    config.expand_empty_elements = true;
    config.check_end_names = false;
    config.trim_text(false);
    reader
}

fn attribute(event: &BytesStart<'_>, name: &str) -> Result<Option<String>, LoadError> {
    for attr in event.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// `rId` → part path, from `xl/_rels/workbook.xml.rels`.
fn read_relationships<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<HashMap<String, String>, LoadError> {
    let xml = read_part(zip, "xl/_rels/workbook.xml.rels")?
        .ok_or_else(|| LoadError::Malformed("workbook relationships are missing".to_string()))?;
    let mut reader = xml_reader(&xml);
    let mut rels = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attribute(&e, "Id")?, attribute(&e, "Target")?) {
                    rels.insert(id, target);
                }
            }
            _ => {}
        }
    }
    Ok(rels)
}

/// Sheet names with their relationship ids, in workbook order.
fn read_workbook<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<Vec<(String, String)>, LoadError> {
    let xml = read_part(zip, "xl/workbook.xml")?
        .ok_or_else(|| LoadError::Malformed("xl/workbook.xml is missing".to_string()))?;
    let mut reader = xml_reader(&xml);
    let mut sheets = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) if e.local_name().as_ref() == b"sheet" => {
                // `r:id`: matched by local name, the prefix varies between writers.
                if let (Some(name), Some(id)) = (attribute(&e, "name")?, attribute(&e, "id")?) {
                    sheets.push((name, id));
                }
            }
            _ => {}
        }
    }
    Ok(sheets)
}

fn read_shared_strings<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<Vec<String>, LoadError> {
    let Some(xml) = read_part(zip, "xl/sharedStrings.xml")? else {
        return Ok(Vec::new());
    };
    let mut reader = xml_reader(&xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut phonetic = false;
    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"rPh" => phonetic = true,
                b"t" if !phonetic => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"rPh" => phonetic = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(t) if in_text => current.push_str(&t.xml_content()?),
            Event::CData(t) if in_text => current.push_str(&t.xml_content()?),
            Event::GeneralRef(r) if in_text => push_entity(&mut current, &r)?,
            _ => {}
        }
    }
    Ok(strings)
}

/// Append an entity or character reference (`&amp;`, `&#10;`, `&#x41;`).
fn push_entity(text: &mut String, reference: &BytesRef<'_>) -> Result<(), LoadError> {
    let raw = reference.xml_content()?;
    if let Some(number) = raw.strip_prefix('#') {
        let code = match number.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => number.parse::<u32>(),
        }
        .map_err(|_| LoadError::Malformed(format!("bad character reference '&{raw};'")))?;
        if let Some(ch) = char::from_u32(code) {
            text.push(ch);
        }
    } else if let Some(entity) = resolve_xml_entity(&raw) {
        text.push_str(entity);
    } else {
        return Err(LoadError::Malformed(format!("unknown entity '&{raw};'")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Worksheet cells
// ---------------------------------------------------------------------------

/// Columns past `XFD`, the last one a worksheet can hold, are malformed.
const MAX_COLUMNS: usize = 16_384;

/// Zero-based column index of a reference such as `AB12`; `None` without letters.
fn column_index(reference: &str) -> Result<Option<usize>, LoadError> {
    let letters: Vec<u8> = reference
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        return Ok(None);
    }
    letters
        .iter()
        .try_fold(0usize, |acc, b| acc.checked_mul(26)?.checked_add(usize::from(b - b'A' + 1)))
        .filter(|&n| n <= MAX_COLUMNS)
        .map(|n| Some(n - 1))
        .ok_or_else(|| LoadError::Malformed(format!("cell reference '{reference}' is beyond column XFD")))
}

fn typed_cell(kind: Option<&str>, value: String, shared: &[String]) -> Result<Cell, LoadError> {
    if value.is_empty() {
        return Ok(Cell::Empty);
    }
    let cell = match kind {
        Some("s") => {
            let idx: usize = value
                .trim()
                .parse()
                .map_err(|_| LoadError::Malformed(format!("bad shared string index '{value}'")))?;
            let s = shared
                .get(idx)
                .ok_or_else(|| LoadError::Malformed(format!("shared string {idx} out of range")))?;
            if s.is_empty() { Cell::Empty } else { Cell::Text(s.clone()) }
        }
        Some("b") => Cell::Bool(value.trim() == "1"),
        // inline strings, formula strings, ISO dates and error literals stay text
        Some("inlineStr") | Some("str") | Some("d") | Some("e") => Cell::Text(value),
        _ => match value.trim().parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(value),
        },
    };
    Ok(cell)
}

/// All rows present in the worksheet, cells placed by their column reference.
fn read_rows(xml: &str, shared: &[String]) -> Result<Vec<Vec<Cell>>, LoadError> {
    let mut reader = xml_reader(xml);
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut row: Vec<Cell> = Vec::new();

    let mut col = 0usize;
    let mut kind: Option<String> = None;
    let mut value = String::new();
    let mut in_value = false;
    let mut in_inline = false;
    let mut in_text = false;
    let mut phonetic = false;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => row.clear(),
                b"c" => {
                    col = match attribute(&e, "r")? {
                        Some(reference) => column_index(&reference)?.unwrap_or(row.len()),
                        None => row.len(),
                    };
                    kind = attribute(&e, "t")?;
                    value.clear();
                }
                b"v" => in_value = true,
                b"is" => in_inline = true,
                b"rPh" => phonetic = true,
                b"t" if in_inline && !phonetic => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                // Formatted but empty rows carry no data.
                b"row" if row.iter().all(|c| matches!(c, Cell::Empty)) => row.clear(),
                b"row" => rows.push(std::mem::take(&mut row)),
                b"c" => {
                    let cell = typed_cell(kind.as_deref(), std::mem::take(&mut value), shared)?;
                    if row.len() <= col {
                        row.resize(col + 1, Cell::Empty);
                    }
                    row[col] = cell;
                }
                b"v" => in_value = false,
                b"is" => in_inline = false,
                b"rPh" => phonetic = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(t) if in_value || in_text => value.push_str(&t.xml_content()?),
            Event::CData(t) if in_value || in_text => value.push_str(&t.xml_content()?),
            Event::GeneralRef(r) if in_value || in_text => push_entity(&mut value, &r)?,
            _ => {}
        }
    }

    Ok(rows)
}
