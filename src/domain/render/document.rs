use serde::Serialize;

use crate::domain::address::AddressKeyFormat;
use crate::domain::batch::ClientMatch;

/// Salutation used when the client row has no first name
pub const DEFAULT_GREETING_NAME: &str = "NEIGHBOR";

/// One nearby sale as shown on a mailer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleLine {
    pub address: String,
    pub price: Option<f64>,
    pub distance_miles: f64,
    pub beds: Option<f64>,
    pub baths: Option<f64>,
    pub square_feet: Option<f64>,
}

/// Everything the renderer needs for a single client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailerDocument {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub nearby: Vec<SaleLine>,
    pub map_url: Option<String>,
}

impl MailerDocument {
    pub fn from_match(
        matched: &ClientMatch,
        format: &AddressKeyFormat,
        map_url: Option<String>,
    ) -> Self {
        let client = &matched.client;

        let first_name = clean_name(client.first_name.as_deref())
            .unwrap_or_else(|| DEFAULT_GREETING_NAME.to_string());
        let last_name = clean_name(client.last_name.as_deref()).unwrap_or_default();
        let city = client
            .city_name()
            .unwrap_or(format.default_city())
            .to_uppercase();

        let nearby = matched
            .nearby
            .iter()
            .map(|sale| SaleLine {
                address: sale.record.address.trim().to_string(),
                price: sale.record.purchase_amount,
                distance_miles: sale.distance_miles,
                beds: sale.record.beds,
                baths: sale.record.baths,
                square_feet: sale.record.square_feet,
            })
            .collect();

        Self {
            first_name,
            last_name,
            address: client.address.trim().to_string(),
            city,
            state: format.state().to_string(),
            zip_code: client.zip_code(),
            nearby,
            map_url,
        }
    }
}

/// Upper-cased name, or `None` for blank cells and spreadsheet `nan`s
fn clean_name(value: Option<&str>) -> Option<String> {
    let value = value?.trim();

    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(value.to_uppercase())
    }
}
