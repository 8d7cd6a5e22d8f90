//! Parsing configuration for HTML extraction
//!
//! Centralized configuration for CSS selectors, characteristic labels and
//! media heuristics. Every list here is ordered and the order is significant:
//! resolution always takes the first match in list order.

use serde::{Deserialize, Serialize};

/// Main parsing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Known "characteristics" regions, tried in order; the first one present wins
    pub characteristic_containers: Vec<String>,

    /// Line-like elements scanned inside a characteristics container
    pub container_items: String,

    /// Elements scanned by the whole-document fallback
    pub document_items: String,

    /// Heading used as title when structured data has no name
    pub title: String,

    /// Title used when neither structured data nor a heading is present
    pub default_title: String,

    /// Description containers, tried in order
    pub description: Vec<String>,

    /// Characteristic labels as printed on the product page
    pub labels: CharacteristicLabels,

    /// Conjunction that separates pairing suggestions ("e" in Portuguese)
    pub pairing_conjunction: String,

    /// Media heuristics
    pub media: MediaSelectors,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            characteristic_containers: vec![
                "div.container-caracteristicas".to_string(),
                "div.caracteristicas".to_string(),
                "div.product-details".to_string(),
                "ul.caracteristicas-bloco".to_string(),
            ],
            container_items: "div, p, li, span".to_string(),
            document_items: "div, li, tr, p, span".to_string(),
            title: "h1".to_string(),
            default_title: "Produto".to_string(),
            description: vec![
                "#descricao".to_string(),
                ".descricao".to_string(),
                ".product-description".to_string(),
                ".product-single__description".to_string(),
            ],
            labels: CharacteristicLabels::default(),
            pairing_conjunction: "e".to_string(),
            media: MediaSelectors::default(),
        }
    }
}

/// Label text for each characteristic field.
///
/// Labels are matched case-insensitively at the start of a text fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacteristicLabels {
    pub producer: String,
    pub country: String,
    pub region: String,
    pub wine_type: String,
    pub grape: String,
    pub volume: String,
    pub vintage: String,
    pub alcohol: String,
    pub serving_temperature: String,
    pub vinification: String,
    pub aging: String,
    pub body: String,
    pub aging_potential: String,
    /// Tried in order until one resolves
    pub pairings: Vec<String>,
}

impl Default for CharacteristicLabels {
    fn default() -> Self {
        Self {
            producer: "Produtor".to_string(),
            country: "País".to_string(),
            region: "Região".to_string(),
            wine_type: "Tipo".to_string(),
            grape: "Uva".to_string(),
            volume: "Volume".to_string(),
            vintage: "Safra".to_string(),
            alcohol: "Teor Alcoólico".to_string(),
            serving_temperature: "Temperatura de Serviço".to_string(),
            vinification: "Vinificação".to_string(),
            aging: "Maturação".to_string(),
            body: "Corpo".to_string(),
            aging_potential: "Potencial de Guarda".to_string(),
            pairings: vec!["Harmoniza".to_string(), "Harmonizações".to_string()],
        }
    }
}

/// Selectors and keywords for locating images and technical sheets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSelectors {
    /// Meta tag holding the preferred product image
    pub og_image: String,

    /// Image elements considered when no meta tag is present
    pub images: String,

    /// Attributes read from each image, first non-empty wins
    pub image_source_attributes: Vec<String>,

    /// Case-insensitive substrings that mark an image source as a product image
    pub image_keywords: Vec<String>,

    /// Hyperlinks considered as technical-sheet candidates
    pub links: String,

    /// Link target suffix of a technical sheet (case-insensitive)
    pub technical_sheet_extension: String,

    /// Visible link text marking a technical sheet (case-insensitive)
    pub technical_sheet_keyword: String,

    /// Known sheets used when a page links none
    pub technical_sheet_overrides: Vec<TechnicalSheetOverride>,
}

impl Default for MediaSelectors {
    fn default() -> Self {
        Self {
            og_image: "meta[property='og:image']".to_string(),
            images: "img".to_string(),
            image_source_attributes: vec!["src".to_string(), "data-src".to_string()],
            image_keywords: vec![
                "produto".to_string(),
                "product".to_string(),
                "go-up".to_string(),
                "cabernet".to_string(),
                "wine".to_string(),
                "vinho".to_string(),
            ],
            links: "a[href]".to_string(),
            technical_sheet_extension: ".pdf".to_string(),
            technical_sheet_keyword: "ficha".to_string(),
            technical_sheet_overrides: vec![TechnicalSheetOverride {
                url_marker: "go-up-cabernet-sauvignon".to_string(),
                sheet_url: "https://goupwines.com.br/wp-content/uploads/2022/02/GO-UP-Cabernet-Sauvignon-Reserva.pdf".to_string(),
            }],
        }
    }
}

/// Static technical sheet for product pages whose URL contains `url_marker`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalSheetOverride {
    pub url_marker: String,
    pub sheet_url: String,
}
