use url::Url;

/// Base of the watched page, used to make extracted hrefs absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBase {
    scheme: String,
    origin: String,
}

impl SourceBase {
    pub fn parse(source_url: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(source_url)?;
        Ok(Self::from_url(&url))
    }

    pub fn from_url(url: &Url) -> Self {
        Self {
            scheme: url.scheme().to_string(),
            origin: url.origin().ascii_serialization(),
        }
    }

    /// Scheme, host and non-default port, without a trailing slash.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Makes `href` absolute.
    ///
    /// - `http://` and `https://` links are returned unchanged.
    /// - `//host/path` takes the scheme of the source.
    /// - `/path` is appended to the origin.
    /// - anything else is appended to the origin after a `/`.
    pub fn resolve(&self, href: &str) -> String {
        let href = href.trim();
        if has_http_scheme(href) {
            href.to_string()
        } else if href.starts_with("//") {
            format!("{}:{}", self.scheme, href)
        } else if href.starts_with('/') {
            format!("{}{}", self.origin, href)
        } else {
            format!("{}/{}", self.origin, href)
        }
    }
}

fn has_http_scheme(href: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        href.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
