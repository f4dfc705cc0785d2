use http::HeaderMap;
use tower_cookies::Cookie;

use crate::{
    builder::CookieBuilder,
    config::{CookieLayout, TokenCookieConfig},
    credential::RotatingCredential,
    error::Result,
    format::{TokenCodec, TokenSet},
    parser::CookieParser,
    remover::{self, CookieRemover},
    store::{self, HeaderStore},
};

/// Builder, parser and remover for one cookie configuration, chosen once up front.
#[derive(Debug, Clone)]
pub struct TokenCookies {
    config: TokenCookieConfig,
    builder: CookieBuilder,
    parser: CookieParser,
}

impl TokenCookies {
    pub fn new(config: TokenCookieConfig, credential: RotatingCredential) -> Self {
        let codec = TokenCodec::new(credential);
        Self {
            builder: CookieBuilder::from_config(codec.clone(), &config),
            parser: CookieParser::from_config(codec, &config),
            config,
        }
    }

    pub fn config(&self) -> &TokenCookieConfig {
        &self.config
    }

    pub fn credential(&self) -> &RotatingCredential {
        match &self.builder {
            CookieBuilder::Single { codec, .. } | CookieBuilder::Multiple { codec, .. } => {
                codec.credential()
            }
        }
    }

    /// The full write-set for `tokens`.
    ///
    /// With the multiple layout this also expires the slots after the last chunk, up to
    /// `max_chunk_count`, so chunks left over from a longer session cannot be read as part of
    /// this one.
    pub fn build_cookies(&self, tokens: &TokenSet) -> Result<Vec<Cookie<'static>>> {
        let chunks = self.builder.build_cookies(tokens)?;
        let written = chunks.len();

        let mut cookies = chunks
            .into_iter()
            .map(|chunk| self.config.build_cookie(chunk.name, chunk.value))
            .collect::<Vec<_>>();
        if self.config.layout() == CookieLayout::Multiple {
            cookies.extend(remover::expire_slots(&self.config, written));
        }

        Ok(cookies)
    }

    pub fn parse_cookies<I, N, V>(&self, cookies: I) -> Result<TokenSet>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        self.parser.parse_cookies(cookies)
    }

    /// Removal cookies for both layouts, whichever one is configured.
    pub fn expire_cookies(&self) -> Vec<Cookie<'static>> {
        CookieRemover::Combined.expire_cookies(&self.config)
    }

    pub fn read<H: HeaderStore + ?Sized>(&self, store: &H) -> Result<TokenSet> {
        match self.config.layout() {
            CookieLayout::Single => {
                let name = self.config.name();
                self.parse_cookies(store.get(name).map(|value| (name, value)))
            }
            CookieLayout::Multiple => self.parse_cookies(store.get_all()),
        }
    }

    /// Read straight from the request's `Cookie` headers.
    ///
    /// Unlike a jar, this sees every repeated name, so a duplicated chunk is refused.
    pub fn read_request(&self, headers: &HeaderMap) -> Result<TokenSet> {
        self.parse_cookies(store::request_cookies(headers))
    }

    pub fn write<H: HeaderStore + ?Sized>(&self, store: &mut H, tokens: &TokenSet) -> Result<()> {
        for cookie in self.build_cookies(tokens)? {
            store.append(cookie);
        }
        Ok(())
    }

    pub fn remove<H: HeaderStore + ?Sized>(&self, store: &mut H) {
        for cookie in self.expire_cookies() {
            store.append(cookie);
        }
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use tower_cookies::cookie::CookieJar;

    use super::*;
    use crate::error::CookieError;

    fn credential() -> RotatingCredential {
        RotatingCredential::from_secrets(["k1"]).expect("credential builds")
    }

    fn request_jar(cookies: Vec<Cookie<'static>>) -> CookieJar {
        let mut jar = CookieJar::new();
        for cookie in cookies {
            jar.add_original(Cookie::new(
                cookie.name().to_string(),
                cookie.value().to_string(),
            ));
        }
        jar
    }

    #[test]
    fn write_then_read_through_a_jar() {
        for layout in [CookieLayout::Single, CookieLayout::Multiple] {
            let config = TokenCookieConfig::default()
                .with_layout(layout)
                .with_max_chunk_bytes(16);
            let token_cookies = TokenCookies::new(config, credential());
            let tokens = TokenSet::new("A", "B", "C");

            let mut response = CookieJar::new();
            token_cookies
                .write(&mut response, &tokens)
                .expect("tokens write");
            let live = response
                .delta()
                .filter(|c| !c.value().is_empty())
                .cloned()
                .collect::<Vec<_>>();

            assert_eq!(
                token_cookies
                    .read(&request_jar(live))
                    .expect("tokens read back"),
                tokens,
                "{layout:?}"
            );
        }
    }

    #[test]
    fn multiple_write_expires_trailing_slots() {
        let config = TokenCookieConfig::default()
            .with_layout(CookieLayout::Multiple)
            .with_max_chunk_bytes(100)
            .with_max_chunk_count(8);
        let token_cookies = TokenCookies::new(config, credential());
        let cookies = token_cookies
            .build_cookies(&TokenSet::new("A", "B", "C"))
            .expect("cookies build");

        let live = cookies.iter().filter(|c| !c.value().is_empty()).count();
        assert!(live < 8);
        assert_eq!(cookies.len(), 8);
        for cookie in &cookies[live..] {
            assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        }
    }

    #[test]
    fn stale_longer_session_does_not_leak_into_a_shorter_one() {
        let config = TokenCookieConfig::default()
            .with_layout(CookieLayout::Multiple)
            .with_max_chunk_bytes(20)
            .with_max_chunk_count(32);
        let token_cookies = TokenCookies::new(config, credential());

        let long = TokenSet::new("A".repeat(200), "B", "C");
        let mut browser = CookieJar::new();
        token_cookies
            .write(&mut browser, &long)
            .expect("long tokens write");

        let short = TokenSet::new("A", "B", "C");
        token_cookies
            .write(&mut browser, &short)
            .expect("short tokens write");

        // The browser drops cookies that arrive already expired.
        let surviving = browser
            .iter()
            .filter(|c| c.expires_datetime() != Some(OffsetDateTime::UNIX_EPOCH))
            .cloned()
            .collect::<Vec<_>>();

        assert_eq!(
            token_cookies
                .read(&request_jar(surviving))
                .expect("short tokens read back"),
            short
        );
    }

    #[test]
    fn read_without_cookies_is_missing() {
        let token_cookies = TokenCookies::new(TokenCookieConfig::default(), credential());

        assert_eq!(
            token_cookies.read(&CookieJar::new()),
            Err(CookieError::CookieMissing {
                name: "AuthToken".into()
            })
        );
    }

    #[test]
    fn read_request_refuses_a_repeated_chunk() {
        let config = TokenCookieConfig::default()
            .with_layout(CookieLayout::Multiple)
            .with_max_chunk_bytes(32);
        let token_cookies = TokenCookies::new(config, credential());
        let live = token_cookies
            .build_cookies(&TokenSet::new("A", "B", "C"))
            .expect("cookies build successfully")
            .into_iter()
            .filter(|c| !c.value().is_empty())
            .map(|c| format!("{}={}", c.name(), c.value()))
            .collect::<Vec<_>>();

        let mut headers = HeaderMap::new();
        let value = format!("AuthToken.0=garbage; {}", live.join("; "));
        headers.insert(
            http::header::COOKIE,
            value.parse().expect("cookie header is valid"),
        );

        assert_eq!(
            token_cookies.read_request(&headers),
            Err(CookieError::DuplicateCookieChunk {
                name: "AuthToken.0".into()
            })
        );
    }

    #[test]
    fn remove_appends_combined_expirations() {
        let config = TokenCookieConfig::default().with_max_chunk_count(4);
        let token_cookies = TokenCookies::new(config, credential());
        let mut jar = CookieJar::new();
        token_cookies.remove(&mut jar);

        assert_eq!(jar.delta().count(), 5);
    }
}
