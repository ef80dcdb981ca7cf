use std::path::Path;

use tracing::debug;

use crate::domain::{AddressRecord, DomainError};

const ADDRESS: &str = "Address";
const CITY: &str = "City";
const ZIP: &str = "ZIP";
const FIRST_NAME: &str = "Primary First";
const LAST_NAME: &str = "Primary Last";
const PURCHASE_AMOUNT: &str = "Purchase Amt";
const BEDS: &str = "Beds";
const BATHS: &str = "Baths";
const SQUARE_FEET: &str = "Sq Ft";

/// Header positions of the columns we consume
#[derive(Debug, Default)]
struct Columns {
    address: usize,
    city: Option<usize>,
    zip: Option<usize>,
    first_name: Option<usize>,
    last_name: Option<usize>,
    purchase_amount: Option<usize>,
    beds: Option<usize>,
    baths: Option<usize>,
    square_feet: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &[String], source: &str) -> Result<Self, DomainError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(name))
        };

        let address = find(ADDRESS).ok_or_else(|| {
            DomainError::input(format!("{}: missing '{}' column", source, ADDRESS))
        })?;

        Ok(Self {
            address,
            city: find(CITY),
            zip: find(ZIP),
            first_name: find(FIRST_NAME),
            last_name: find(LAST_NAME),
            purchase_amount: find(PURCHASE_AMOUNT),
            beds: find(BEDS),
            baths: find(BATHS),
            square_feet: find(SQUARE_FEET),
        })
    }
}

/// Read a client or sold-homes CSV file
///
/// A missing or unparseable file is an input error and aborts the run.
pub async fn load_address_records(path: &Path) -> Result<Vec<AddressRecord>, DomainError> {
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DomainError::input(format!("{}: cannot read file: {}", source, e)))?;

    parse_address_records(&bytes, &source)
}

/// Parse CSV bytes; `source` names the file in error messages
pub fn parse_address_records(bytes: &[u8], source: &str) -> Result<Vec<AddressRecord>, DomainError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|e| DomainError::input(format!("{}: invalid CSV header: {}", source, e)))?
        .iter()
        .map(|field| {
            String::from_utf8_lossy(field)
                .trim_start_matches('\u{feff}')
                .trim()
                .to_string()
        })
        .collect();

    let columns = Columns::from_headers(&headers, source)?;
    let mut records = Vec::new();

    for (index, result) in reader.byte_records().enumerate() {
        // Spreadsheet row: header is row 1, a multi-line quoted cell is still one row
        let row = index + 2;
        let fields = result.map_err(|e| {
            DomainError::input(format!("{}: CSV parse error at row {}: {}", source, row, e))
        })?;

        let text = |column: Option<usize>| -> Option<String> {
            column
                .and_then(|i| fields.get(i))
                .map(|raw| String::from_utf8_lossy(raw).trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let number = |column: Option<usize>| text(column).and_then(|value| parse_number(&value));

        records.push(AddressRecord {
            row,
            address: text(Some(columns.address)).unwrap_or_default(),
            city: text(columns.city),
            zip: text(columns.zip),
            first_name: text(columns.first_name),
            last_name: text(columns.last_name),
            purchase_amount: number(columns.purchase_amount),
            beds: number(columns.beds),
            baths: number(columns.baths),
            square_feet: number(columns.square_feet),
        });
    }

    debug!(source, rows = records.len(), "CSV loaded");
    Ok(records)
}

/// Numbers as exported by MLS tools: `$455,000`, `1,850`, `2.5`
fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}
