//! Primary image and technical sheet discovery

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::config::{MediaSelectors, TechnicalSheetOverride};
use super::{compile_selector, flatten_text, push_unique, resolve_href, ParsingResult};
use crate::domain::Media;

#[derive(Debug, Clone)]
pub struct MediaLocator {
    og_image: Selector,
    images: Selector,
    links: Selector,
    source_attributes: Vec<String>,
    image_keywords: Vec<String>,
    sheet_extension: String,
    sheet_keyword: String,
    overrides: Vec<TechnicalSheetOverride>,
}

impl MediaLocator {
    pub fn new(config: &MediaSelectors) -> ParsingResult<Self> {
        Ok(Self {
            og_image: compile_selector(&config.og_image)?,
            images: compile_selector(&config.images)?,
            links: compile_selector(&config.links)?,
            source_attributes: config.image_source_attributes.clone(),
            image_keywords: config.image_keywords.iter().map(|k| k.to_lowercase()).collect(),
            sheet_extension: config.technical_sheet_extension.to_lowercase(),
            sheet_keyword: config.technical_sheet_keyword.to_lowercase(),
            overrides: config.technical_sheet_overrides.clone(),
        })
    }

    /// Media block for a product page.
    ///
    /// `page_url` is matched against the override list when the page links no
    /// technical sheet of its own.
    pub fn locate(&self, html: &Html, page_url: &Url, requested_url: &str) -> Media {
        let technical_sheet_url = self
            .locate_technical_sheets(html, page_url)
            .into_iter()
            .next()
            .or_else(|| self.technical_sheet_override(requested_url));

        Media {
            primary_image_url: self.locate_primary_image(html, page_url),
            technical_sheet_url,
        }
    }

    /// The `og:image` meta tag when present, otherwise the longest keyword-matching image
    pub fn locate_primary_image(&self, html: &Html, page_url: &Url) -> Option<String> {
        if let Some(content) = html
            .select(&self.og_image)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .filter(|content| !content.trim().is_empty())
        {
            return resolve_href(page_url, content).map(String::from);
        }

        let mut candidates = Vec::new();
        for image in html.select(&self.images) {
            let Some(source) = self.image_source(image) else {
                continue;
            };
            let lowered = source.to_lowercase();
            if !self.image_keywords.iter().any(|k| lowered.contains(k.as_str())) {
                continue;
            }
            if let Some(url) = resolve_href(page_url, source) {
                push_unique(&mut candidates, url.into());
            }
        }

        longest_first_wins(candidates)
    }

    /// Every link that targets a sheet document or whose text names one, in page order
    pub fn locate_technical_sheets(&self, html: &Html, page_url: &Url) -> Vec<String> {
        let mut sheets = Vec::new();

        for link in html.select(&self.links) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let is_document = href.to_lowercase().ends_with(&self.sheet_extension);
            let is_named = !self.sheet_keyword.is_empty()
                && flatten_text(link).to_lowercase().contains(&self.sheet_keyword);

            if is_document || is_named {
                if let Some(url) = resolve_href(page_url, href) {
                    push_unique(&mut sheets, url.into());
                }
            }
        }

        sheets
    }

    /// Static sheet registered for a product URL, if any
    pub fn technical_sheet_override(&self, url: &str) -> Option<String> {
        self.overrides
            .iter()
            .find(|o| url.contains(&o.url_marker))
            .map(|o| o.sheet_url.clone())
    }

    fn image_source<'a>(&self, image: ElementRef<'a>) -> Option<&'a str> {
        self.source_attributes
            .iter()
            .filter_map(|attribute| image.value().attr(attribute))
            .find(|source| !source.is_empty())
    }
}

/// Longest URL string; on equal length the earlier candidate is kept
fn longest_first_wins(candidates: Vec<String>) -> Option<String> {
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(current) if current.len() >= candidate.len() => Some(current),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://www.tdpwines.com.br/produto/go-up-cabernet-sauvignon/";

    fn locator() -> MediaLocator {
        MediaLocator::new(&MediaSelectors::default()).unwrap()
    }

    fn page_url() -> Url {
        Url::parse(PAGE).unwrap()
    }

    #[test]
    fn og_image_is_preferred_and_resolved() {
        let html = Html::parse_document(
            r#"<head><meta property="og:image" content="/img/garrafa.png"></head>
               <body><img src="/media/produto/very-long-product-image-name.jpg"></body>"#,
        );
        assert_eq!(
            locator().locate_primary_image(&html, &page_url()).as_deref(),
            Some("https://www.tdpwines.com.br/img/garrafa.png")
        );
    }

    #[test]
    fn longest_keyword_image_wins() {
        let html = Html::parse_document(
            r#"<body>
               <img src="/static/logo.svg">
               <img src="/media/vinho-a.jpg">
               <img data-src="/media/produto/go-up-cabernet-1200x1200.jpg">
               <img src="/media/vinho-a.jpg">
               </body>"#,
        );
        assert_eq!(
            locator().locate_primary_image(&html, &page_url()).as_deref(),
            Some("https://www.tdpwines.com.br/media/produto/go-up-cabernet-1200x1200.jpg")
        );
    }

    #[test]
    fn equal_length_images_keep_first_seen() {
        assert_eq!(
            longest_first_wins(vec!["aaa".into(), "bbb".into(), "cc".into()]).as_deref(),
            Some("aaa")
        );
        assert_eq!(longest_first_wins(Vec::new()), None);
    }

    #[test]
    fn no_matching_image_yields_none() {
        let html = Html::parse_document(r#"<body><img src="/static/banner.png"><img></body>"#);
        assert_eq!(locator().locate_primary_image(&html, &page_url()), None);
    }

    #[test]
    fn technical_sheets_by_extension_or_text() {
        let html = Html::parse_document(
            r#"<body>
               <a href="/docs/Reserva.PDF">Baixar</a>
               <a href="https://drive.google.com/file/d/abc123/view">Ficha Técnica</a>
               <a href="/docs/Reserva.PDF">de novo</a>
               <a href="/contato">Contato</a>
               </body>"#,
        );
        assert_eq!(
            locator().locate_technical_sheets(&html, &page_url()),
            [
                "https://www.tdpwines.com.br/docs/Reserva.PDF",
                "https://drive.google.com/file/d/abc123/view",
            ]
        );
    }

    #[test]
    fn override_applies_only_without_discovered_sheet() {
        let locator = locator();
        let bare = Html::parse_document("<body></body>");
        let media = locator.locate(&bare, &page_url(), PAGE);
        assert!(media.technical_sheet_url.unwrap().ends_with("GO-UP-Cabernet-Sauvignon-Reserva.pdf"));

        let linked = Html::parse_document(r#"<body><a href="/f.pdf">pdf</a></body>"#);
        let media = locator.locate(&linked, &page_url(), PAGE);
        assert_eq!(media.technical_sheet_url.as_deref(), Some("https://www.tdpwines.com.br/f.pdf"));
    }

    #[test]
    fn unknown_product_has_no_override() {
        assert_eq!(locator().technical_sheet_override("https://x.test/produto/outro/"), None);
    }
}
