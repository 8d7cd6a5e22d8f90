use serde::{Deserialize, Serialize};

/// Canonical record for one product page.
///
/// Field order is the serialized key order. Keys keep the catalog's
/// Portuguese names so bundles stay compatible with existing consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "codigo_produto")]
    pub product_code: String,
    pub url: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao_geral")]
    pub description: Option<String>,
    #[serde(rename = "caracteristicas")]
    pub characteristics: Characteristics,
    #[serde(rename = "midia")]
    pub media: Media,
}

/// Fixed-shape characteristics map; every field is absent when unresolved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Characteristics {
    #[serde(rename = "produtor")]
    pub producer: Option<String>,
    #[serde(rename = "pais")]
    pub country: Option<String>,
    #[serde(rename = "regiao")]
    pub region: Option<String>,
    #[serde(rename = "tipo")]
    pub wine_type: Option<String>,
    #[serde(rename = "uva")]
    pub grape: Option<String>,
    pub volume_ml: Option<VolumeMl>,
    #[serde(rename = "safra")]
    pub vintage: Option<String>,
    #[serde(rename = "teor_alcoolico_percent")]
    pub alcohol_percent: Option<AlcoholPercent>,
    #[serde(rename = "temperatura_servico_c")]
    pub serving_temperature: Option<String>,
    #[serde(rename = "vinificacao")]
    pub vinification: Option<String>,
    #[serde(rename = "maturacao")]
    pub aging: Option<String>,
    #[serde(rename = "corpo")]
    pub body: Option<String>,
    #[serde(rename = "potencial_guarda_anos")]
    pub aging_potential: Option<String>,
    #[serde(rename = "harmonizacoes")]
    pub pairings: Option<Vec<String>>,
}

/// Volume in millilitres, or the raw text when no `<n> ml` pattern was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VolumeMl {
    Millilitres(u64),
    Raw(String),
}

/// Alcohol content as a percentage, or the raw text when no number was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlcoholPercent {
    Percent(f64),
    Raw(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "imagem_principal_url")]
    pub primary_image_url: Option<String>,
    #[serde(rename = "ficha_tecnica_url")]
    pub technical_sheet_url: Option<String>,
}

impl ProductRecord {
    /// Whether any characteristic was resolved at all
    pub fn has_characteristics(&self) -> bool {
        self.characteristics != Characteristics::default()
    }
}
