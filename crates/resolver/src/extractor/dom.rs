use scraper::{Html, Selector};

use crate::error::ResolverError;

/// First value of `attribute` on an element matching `selector`.
///
/// An unparsable selector is a configuration mistake and is reported as an error.
pub fn select_attribute(
    html: &str,
    selector: &str,
    attribute: &str,
) -> Result<Option<String>, ResolverError> {
    let selector = Selector::parse(selector).map_err(|e| {
        ResolverError::InvalidArgument(format!("invalid CSS selector `{selector}`: {e}"))
    })?;

    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .filter_map(|element| element.value().attr(attribute))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(ToOwned::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_player_iframe_src() {
        let html = r#"
            <html><body>
              <iframe src="//ads.example/banner"></iframe>
              <div id="the_frame">
                <iframe id="player_iframe" src="//cloudnestra.example/rcp/abc" frameborder="0"></iframe>
              </div>
            </body></html>"#;
        let src = select_attribute(html, "iframe#player_iframe", "src").unwrap();
        assert_eq!(src.as_deref(), Some("//cloudnestra.example/rcp/abc"));
    }

    #[test]
    fn missing_element_is_none() {
        let src = select_attribute("<html></html>", "iframe#player_iframe", "src").unwrap();
        assert!(src.is_none());
    }

    #[test]
    fn bad_selector_is_an_error() {
        let err = select_attribute("<html></html>", "iframe[", "src").unwrap_err();
        assert!(matches!(err, ResolverError::InvalidArgument(_)));
    }
}
