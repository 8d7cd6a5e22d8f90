use url::Url;

/// Fallback code when a URL path has no usable last segment
pub const DEFAULT_PRODUCT_SLUG: &str = "produto";

/// Derive a product slug from the path of `url`.
///
/// Trailing slashes are ignored; query and fragment never contribute.
pub fn slug_from_url(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        // Not absolute: treat everything before `?`/`#` as the path
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(DEFAULT_PRODUCT_SLUG)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://www.tdpwines.com.br/produto/vinho-tinto-reserva/", "vinho-tinto-reserva")]
    #[case("https://www.tdpwines.com.br/produto/vinho-tinto-reserva", "vinho-tinto-reserva")]
    #[case("https://www.tdpwines.com.br/go-up-cabernet?pg=2#top", "go-up-cabernet")]
    #[case("https://www.tdpwines.com.br/", "produto")]
    #[case("https://www.tdpwines.com.br", "produto")]
    #[case("/vinho-branco///", "vinho-branco")]
    fn slug_is_last_path_segment(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(slug_from_url(url), expected);
    }
}
