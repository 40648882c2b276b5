use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const HEADERS: [&str; 7] = [
    "Provider",
    "OrgType",
    "Category",
    "Contract Value",
    "enr_CQC_Rating",
    "enr_Summary",
    "enr_Companies_House_Info",
];

const PRIVATE_ORG: &str = "Independent Ltd/LLP/Co.";
const PRIVATE_CATEGORY: &str = "Private Community Sector Providers (Non NHS)";

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One generated contract line; `value` is the raw cell text.
struct Row {
    provider: String,
    org_type: &'static str,
    category: &'static str,
    value: String,
    rating: Option<&'static str>,
    summary: String,
    companies_house: Option<String>,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let ratings = ["Outstanding", "Good", "Requires improvement", "Inadequate"];
    let mut rows = Vec::new();

    // Private community providers: totals spread below, inside and above £1m–£4m.
    let private_names = [
        "Abbeyfield Homecare", "Bridgewater Support", "Cedar Lodge Care", "Dovetail Living",
        "Elm Tree Domiciliary", "Fairhaven Partners", "Greenway Supported Living", "Harbour House Care",
        "Ivy Court Services", "Juniper Community Care", "Kingsway Respite", "Lavender Fields Care",
    ];
    for (p, name) in private_names.iter().enumerate() {
        let target = 250_000.0 * (p as f64 + 1.0) * (0.8 + 0.4 * rng.next_f64());
        let lines = 1 + (rng.next_u64() % 4) as usize;
        let rating = if p % 5 == 4 { None } else { Some(ratings[p % ratings.len()]) };
        for _ in 0..lines {
            rows.push(Row {
                provider: name.to_string(),
                org_type: PRIVATE_ORG,
                category: PRIVATE_CATEGORY,
                value: format!("{:.2}", target / lines as f64),
                rating,
                summary: format!("{name} provides community care in north east London."),
                companies_house: Some(format!("Company number {:08}", 1_000_000 + p * 7919)),
            });
        }
    }

    // Statutory and voluntary providers.
    let others: [(&str, &[&str]); 3] = [
        ("NHS Trust", &["Acute Services", "Mental Health", "Community Health Services"]),
        ("Local Authority", &["Social Care", "Public Health"]),
        ("Charity/CIC", &["Voluntary Sector Grants", "Community Health Services"]),
    ];
    for (o, &(org_type, categories)) in others.iter().enumerate() {
        for n in 0..6 {
            let name = format!("{} {}", org_type.split('/').next().unwrap_or(org_type), n + 1);
            for _ in 0..3 {
                let value = if rng.next_f64() < 0.05 {
                    "N/A".to_string()
                } else {
                    format!("{:.2}", 10_000.0 + rng.next_f64() * 8_000_000.0 * (o as f64 + 1.0))
                };
                rows.push(Row {
                    provider: name.clone(),
                    org_type,
                    category: rng.pick(categories),
                    value,
                    rating: (rng.next_f64() < 0.7).then(|| rng.pick(&ratings)),
                    summary: format!("{name} ({org_type})"),
                    companies_house: None,
                });
            }
        }
    }

    rows
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn column_letter(i: usize) -> char {
    (b'A' + i as u8) as char
}

fn inline_cell(reference: &str, text: &str) -> String {
    format!(r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#, escape(text))
}

/// Write a single-sheet workbook named `merged_data` using inline strings.
fn write_xlsx(path: &str, rows: &[Row]) -> Result<()> {
    let mut sheet = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#);

    sheet.push_str(r#"<row r="1">"#);
    for (i, h) in HEADERS.iter().enumerate() {
        sheet.push_str(&inline_cell(&format!("{}1", column_letter(i)), h));
    }
    sheet.push_str("</row>");

    for (n, row) in rows.iter().enumerate() {
        let r = n + 2;
        sheet.push_str(&format!(r#"<row r="{r}">"#));
        sheet.push_str(&inline_cell(&format!("A{r}"), &row.provider));
        sheet.push_str(&inline_cell(&format!("B{r}"), row.org_type));
        sheet.push_str(&inline_cell(&format!("C{r}"), row.category));
        if row.value.parse::<f64>().is_ok() {
            sheet.push_str(&format!(r#"<c r="D{r}"><v>{}</v></c>"#, row.value));
        } else {
            sheet.push_str(&inline_cell(&format!("D{r}"), &row.value));
        }
        if let Some(rating) = row.rating {
            sheet.push_str(&inline_cell(&format!("E{r}"), rating));
        }
        sheet.push_str(&inline_cell(&format!("F{r}"), &row.summary));
        if let Some(ch) = &row.companies_house {
            sheet.push_str(&inline_cell(&format!("G{r}"), ch));
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let parts: [(&str, String); 5] = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="merged_data" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
        ),
        ("xl/worksheets/sheet1.xml", sheet),
    ];

    let mut zip = ZipWriter::new(File::create(path).with_context(|| format!("creating {path}"))?);
    let options = SimpleFileOptions::default();
    for (name, content) in &parts {
        zip.start_file(*name, options)?;
        zip.write_all(content.as_bytes())?;
    }
    zip.finish()?;
    Ok(())
}

/// Same rows as a flat Parquet table; non-numeric values become nulls.
fn write_parquet(path: &str, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADERS[0], DataType::Utf8, false),
        Field::new(HEADERS[1], DataType::Utf8, false),
        Field::new(HEADERS[2], DataType::Utf8, false),
        Field::new(HEADERS[3], DataType::Float64, true),
        Field::new(HEADERS[4], DataType::Utf8, true),
        Field::new(HEADERS[5], DataType::Utf8, true),
        Field::new(HEADERS[6], DataType::Utf8, true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.provider.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.org_type))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.category))),
        Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.value.parse::<f64>().ok()))),
        Arc::new(StringArray::from_iter(rows.iter().map(|r| r.rating))),
        Arc::new(StringArray::from_iter(rows.iter().map(|r| Some(r.summary.as_str())))),
        Arc::new(StringArray::from_iter(rows.iter().map(|r| r.companies_house.as_deref()))),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    arrow::util::pretty::print_batches(&[batch.slice(0, batch.num_rows().min(5))])?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_xlsx("NEL_Main_Enriched_Output.xlsx", &rows)?;
    write_parquet("NEL_Main_Enriched_Output.parquet", &rows)?;

    println!(
        "Wrote {} contract rows to NEL_Main_Enriched_Output.xlsx (sheet merged_data) and NEL_Main_Enriched_Output.parquet",
        rows.len()
    );
    Ok(())
}
