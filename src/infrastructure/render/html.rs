use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use super::assets::MailerAssets;
use super::format::{
    format_beds_baths, format_distance, format_price, format_square_feet, truncate_address,
};
use super::template::{escape_html, MailerTemplate};
use crate::domain::{DomainError, MailerDocument, MailerRenderer, RenderedMailer};

pub const INDIVIDUAL_DIR: &str = "individual";
pub const MERGED_FILE: &str = "final_mailers.html";
pub const DEFAULT_BRAND: &str = "YOUR NEIGHBORHOOD REAL ESTATE TEAM";

const TRIFOLD_TEMPLATE: &str = include_str!("trifold.html");

/// Renders each client onto the tri-fold letter template as a standalone HTML page
#[derive(Debug, Clone)]
pub struct HtmlMailerRenderer {
    output_dir: PathBuf,
    template: MailerTemplate,
    assets: MailerAssets,
    brand: String,
}

impl HtmlMailerRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            template: MailerTemplate::parse(TRIFOLD_TEMPLATE),
            assets: MailerAssets::default(),
            brand: DEFAULT_BRAND.to_string(),
        }
    }

    pub fn with_template(mut self, template: MailerTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_assets(mut self, assets: MailerAssets) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn individual_dir(&self) -> PathBuf {
        self.output_dir.join(INDIVIDUAL_DIR)
    }

    fn values(&self, document: &MailerDocument) -> HashMap<String, String> {
        let mut values = HashMap::new();
        values.insert("brand".to_string(), self.brand.clone());
        values.insert("first_name".to_string(), document.first_name.clone());
        values.insert("last_name".to_string(), document.last_name.clone());
        values.insert("address".to_string(), document.address.clone());
        values.insert("city".to_string(), document.city.clone());
        values.insert("state".to_string(), document.state.clone());
        values.insert("zip_code".to_string(), document.zip_code.clone());
        values.insert("sales_rows".to_string(), sales_rows(document));
        values.insert("map".to_string(), map_block(document.map_url.as_deref()));
        values.insert(
            "top_banner".to_string(),
            image_block(
                "top-banner",
                self.assets.top_banner.as_deref(),
                "Top Banner",
                Some("[Top Banner - upload your custom design]"),
            ),
        );
        values.insert(
            "bottom_banner".to_string(),
            image_block(
                "bottom-banner",
                self.assets.bottom_banner.as_deref(),
                "Bottom Banner",
                Some("[Bottom Banner - upload your custom design / call-to-action]"),
            ),
        );
        values.insert(
            "right_side_image".to_string(),
            image_block(
                "right-side-image",
                self.assets.right_side_image.as_deref(),
                "Right Side Image",
                None,
            ),
        );
        values
    }
}

fn sales_rows(document: &MailerDocument) -> String {
    document
        .nearby
        .iter()
        .map(|sale| {
            format!(
                "<tr><td>{}</td><td class=\"price-cell\">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&truncate_address(&sale.address)),
                escape_html(&format_price(sale.price)),
                escape_html(&format_beds_baths(sale.beds, sale.baths)),
                escape_html(&format_square_feet(sale.square_feet)),
                escape_html(&format_distance(sale.distance_miles)),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn map_block(map_url: Option<&str>) -> String {
    match map_url {
        Some(url) => format!(
            "<img src=\"{}\" alt=\"Neighborhood Map\">",
            escape_html(url)
        ),
        None => "<div class=\"placeholder\">Map unavailable</div>".to_string(),
    }
}

fn image_block(class: &str, data_uri: Option<&str>, alt: &str, placeholder: Option<&str>) -> String {
    match (data_uri, placeholder) {
        (Some(uri), _) => format!(
            "<div class=\"{}\"><img src=\"{}\" alt=\"{}\"></div>",
            class,
            escape_html(uri),
            alt
        ),
        (None, Some(text)) => format!("<div class=\"{} placeholder\">{}</div>", class, text),
        (None, None) => String::new(),
    }
}

/// Split a page into the part up to and including `<body ...>` and the body content
fn split_body(html: &str) -> (&str, &str) {
    let Some(open) = html.find("<body") else {
        return ("", html);
    };
    let Some(open_end) = html[open..].find('>').map(|i| open + i + 1) else {
        return ("", html);
    };
    let close = html.rfind("</body>").filter(|&i| i >= open_end).unwrap_or(html.len());

    (&html[..open_end], &html[open_end..close])
}

#[async_trait]
impl MailerRenderer for HtmlMailerRenderer {
    async fn render(
        &self,
        index: usize,
        document: &MailerDocument,
    ) -> Result<RenderedMailer, DomainError> {
        let html = self.template.render(&self.values(document))?;

        let dir = self.individual_dir();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            DomainError::render(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let path = dir.join(format!("mailer_{}.html", index));
        tokio::fs::write(&path, html).await.map_err(|e| {
            DomainError::render(format!("Failed to write {}: {}", path.display(), e))
        })?;

        debug!(index, path = %path.display(), "Mailer rendered");
        Ok(RenderedMailer { index, path })
    }

    async fn merge(&self, rendered: &[RenderedMailer]) -> Result<Option<PathBuf>, DomainError> {
        if rendered.is_empty() {
            return Ok(None);
        }

        let mut prefix = None;
        let mut pages = String::new();

        for mailer in rendered {
            let html = tokio::fs::read_to_string(&mailer.path).await.map_err(|e| {
                DomainError::storage(format!("Failed to read {}: {}", mailer.path.display(), e))
            })?;
            let (head, body) = split_body(&html);
            if prefix.is_none() {
                prefix = Some(head.to_string());
            }
            pages.push_str("<section class=\"mailer-page\">");
            pages.push_str(body);
            pages.push_str("</section>\n");
        }

        let merged = format!(
            "{}\n{}</body>\n</html>\n",
            prefix.unwrap_or_default(),
            pages
        );

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(MERGED_FILE);
        tokio::fs::write(&path, merged).await.map_err(|e| {
            DomainError::storage(format!("Failed to write {}: {}", path.display(), e))
        })?;

        info!(path = %path.display(), pages = rendered.len(), "Mailers merged");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::render::SaleLine;
    use tempfile::TempDir;

    fn document(first_name: &str) -> MailerDocument {
        MailerDocument {
            first_name: first_name.to_string(),
            last_name: "LOPEZ".to_string(),
            address: "4512 Panorama Dr".to_string(),
            city: "BAKERSFIELD".to_string(),
            state: "CA".to_string(),
            zip_code: "93306".to_string(),
            nearby: vec![SaleLine {
                address: "12345 Very Long Boulevard Name".to_string(),
                price: Some(455_000.0),
                distance_miles: 0.6912,
                beds: Some(3.0),
                baths: Some(2.0),
                square_feet: Some(1_850.0),
            }],
            map_url: Some("https://maps.example/static?a=1&b=2".to_string()),
        }
    }

    #[tokio::test]
    async fn test_render_writes_individual_page() {
        let dir = TempDir::new().unwrap();
        let renderer = HtmlMailerRenderer::new(dir.path());

        let rendered = renderer.render(0, &document("MARIA")).await.unwrap();
        assert_eq!(rendered.index, 0);
        assert_eq!(rendered.path, dir.path().join("individual").join("mailer_0.html"));

        let html = std::fs::read_to_string(&rendered.path).unwrap();
        assert!(html.contains("MARIA LOPEZ"));
        assert!(html.contains("BAKERSFIELD, CA 93306"));
        assert!(html.contains("12345 Very Long Boulevard..."));
        assert!(html.contains("$455k"));
        assert!(html.contains("3/2"));
        assert!(html.contains("1,850"));
        assert!(html.contains("0.69 mi"));
        assert!(html.contains("src=\"https://maps.example/static?a=1&amp;b=2\""));
        assert!(html.contains("top-banner placeholder"));
        assert!(!html.contains("${"));
    }

    #[tokio::test]
    async fn test_names_are_escaped() {
        let dir = TempDir::new().unwrap();
        let renderer = HtmlMailerRenderer::new(dir.path());

        let rendered = renderer.render(1, &document("<SCRIPT>")).await.unwrap();
        let html = std::fs::read_to_string(&rendered.path).unwrap();
        assert!(html.contains("&lt;SCRIPT&gt;"));
        assert!(!html.contains("<SCRIPT>"));
    }

    #[tokio::test]
    async fn test_assets_are_embedded() {
        let dir = TempDir::new().unwrap();
        let renderer = HtmlMailerRenderer::new(dir.path()).with_assets(MailerAssets {
            top_banner: Some("data:image/png;base64,AAAA".to_string()),
            ..MailerAssets::default()
        });

        let rendered = renderer.render(0, &document("MARIA")).await.unwrap();
        let html = std::fs::read_to_string(&rendered.path).unwrap();
        assert!(html.contains("<img src=\"data:image/png;base64,AAAA\" alt=\"Top Banner\">"));
        assert!(!html.contains("right-side-image\">"));
    }

    #[tokio::test]
    async fn test_merge_concatenates_pages_in_order() {
        let dir = TempDir::new().unwrap();
        let renderer = HtmlMailerRenderer::new(dir.path());

        let first = renderer.render(0, &document("ANA")).await.unwrap();
        let second = renderer.render(1, &document("BEN")).await.unwrap();

        let merged = renderer.merge(&[first, second]).await.unwrap().unwrap();
        assert_eq!(merged, dir.path().join(MERGED_FILE));

        let html = std::fs::read_to_string(&merged).unwrap();
        assert_eq!(html.matches("<section class=\"mailer-page\">").count(), 2);
        assert_eq!(html.matches("<body>").count(), 1);
        assert!(html.find("ANA LOPEZ").unwrap() < html.find("BEN LOPEZ").unwrap());
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[tokio::test]
    async fn test_merge_nothing() {
        let dir = TempDir::new().unwrap();
        let renderer = HtmlMailerRenderer::new(dir.path());

        assert!(renderer.merge(&[]).await.unwrap().is_none());
        assert!(!dir.path().join(MERGED_FILE).exists());
    }

    #[tokio::test]
    async fn test_merge_missing_page_fails() {
        let dir = TempDir::new().unwrap();
        let renderer = HtmlMailerRenderer::new(dir.path());
        let ghost = RenderedMailer {
            index: 0,
            path: dir.path().join("individual").join("mailer_0.html"),
        };

        assert!(matches!(
            renderer.merge(&[ghost]).await,
            Err(DomainError::Storage { .. })
        ));
    }

    #[test]
    fn test_split_body() {
        let (head, body) = split_body("<html><body class=\"x\"><p>hi</p></body></html>");
        assert_eq!(head, "<html><body class=\"x\">");
        assert_eq!(body, "<p>hi</p>");

        assert_eq!(split_body("<p>bare</p>"), ("", "<p>bare</p>"));
    }
}
