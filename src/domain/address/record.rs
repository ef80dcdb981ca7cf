use serde::Serialize;

/// Marker text of the disclaimer footer rows that MLS exports append to the data
pub const BOILERPLATE_MARKER: &str = "The information";

/// One row of the client list or the sold-homes list
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AddressRecord {
    /// 1-based row number in the source file (the header is row 1)
    pub row: usize,
    pub address: String,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub purchase_amount: Option<f64>,
    pub beds: Option<f64>,
    pub baths: Option<f64>,
    pub square_feet: Option<f64>,
}

impl AddressRecord {
    pub fn new(row: usize, address: impl Into<String>) -> Self {
        Self {
            row,
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_zip(mut self, zip: impl Into<String>) -> Self {
        self.zip = Some(zip.into());
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    pub fn with_sale(
        mut self,
        purchase_amount: f64,
        beds: Option<f64>,
        baths: Option<f64>,
        square_feet: Option<f64>,
    ) -> Self {
        self.purchase_amount = Some(purchase_amount);
        self.beds = beds;
        self.baths = baths;
        self.square_feet = square_feet;
        self
    }

    /// True for disclaimer rows that leak into the CSV export
    pub fn is_boilerplate(&self) -> bool {
        self.address.contains(BOILERPLATE_MARKER)
    }

    /// Postal code with spreadsheet float artefacts (`93301.0`) removed
    pub fn zip_code(&self) -> String {
        self.zip
            .as_deref()
            .map(|zip| zip.split('.').next().unwrap_or_default().trim().to_string())
            .unwrap_or_default()
    }

    /// City when present and non-blank
    pub fn city_name(&self) -> Option<&str> {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
    }
}
