use crate::{
    chunk,
    config::{CookieLayout, TokenCookieConfig},
    credential,
    error::{CookieError, Result},
    format::{TokenCodec, TokenSet},
};

/// Reads a [`TokenSet`] back out of request cookies.
///
/// Must be configured with the same layout the cookies were written with.
#[derive(Debug, Clone)]
pub enum CookieParser {
    Single { codec: TokenCodec, name: String },
    Multiple { codec: TokenCodec, name: String },
}

impl CookieParser {
    pub fn from_config(codec: TokenCodec, config: &TokenCookieConfig) -> Self {
        let name = config.name().to_string();
        match config.layout() {
            CookieLayout::Single => Self::Single { codec, name },
            CookieLayout::Multiple => Self::Multiple { codec, name },
        }
    }

    pub fn layout(&self) -> CookieLayout {
        match self {
            Self::Single { .. } => CookieLayout::Single,
            Self::Multiple { .. } => CookieLayout::Multiple,
        }
    }

    pub fn parse_cookies<I, N, V>(&self, cookies: I) -> Result<TokenSet>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let cookies = cookies
            .into_iter()
            .map(|(n, v)| (n.as_ref().to_owned(), v.as_ref().to_owned()))
            .collect::<Vec<_>>();

        match self {
            Self::Single { codec, name } => {
                let (_, value) = cookies
                    .iter()
                    .find(|(n, _)| n == name)
                    .ok_or_else(|| CookieError::CookieMissing { name: name.clone() })?;
                codec.decode(value)
            }
            Self::Multiple { codec, name } => {
                let envelope = chunk::reassemble(cookies.iter().cloned(), name)?;

                // Dropping the last chunk leaves a contiguous prefix; the signature segment is
                // the tail of the envelope, so it comes up short.
                if !credential::is_complete(&envelope) {
                    let missing = (0..)
                        .take_while(|ordinal| {
                            let expected = chunk::chunk_name(name, *ordinal);
                            cookies.iter().any(|(n, _)| *n == expected)
                        })
                        .count();
                    return Err(CookieError::IncompleteCookieChunks {
                        name: name.clone(),
                        missing,
                    });
                }

                codec.decode(&envelope)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builder::CookieBuilder, credential::RotatingCredential};

    fn codec() -> TokenCodec {
        TokenCodec::new(RotatingCredential::from_secrets(["k1"]).expect("credential builds"))
    }

    fn multiple(limit: usize) -> TokenCookieConfig {
        TokenCookieConfig::default()
            .with_layout(CookieLayout::Multiple)
            .with_max_chunk_bytes(limit)
    }

    fn built(config: &TokenCookieConfig) -> Vec<(String, String)> {
        CookieBuilder::from_config(codec(), config)
            .build_cookies(&TokenSet::new("A", "B", "C"))
            .expect("cookies build")
            .into_iter()
            .map(|c| (c.name, c.value))
            .collect()
    }

    #[test]
    fn single_round_trip() {
        let config = TokenCookieConfig::default();
        let parser = CookieParser::from_config(codec(), &config);

        assert_eq!(
            parser.parse_cookies(built(&config)).expect("cookies parse"),
            TokenSet::new("A", "B", "C")
        );
    }

    #[test]
    fn single_missing_cookie() {
        let parser = CookieParser::from_config(codec(), &TokenCookieConfig::default());

        assert_eq!(
            parser.parse_cookies([("theme", "dark")]),
            Err(CookieError::CookieMissing {
                name: "AuthToken".into()
            })
        );
    }

    #[test]
    fn single_layout_ignores_chunked_cookies() {
        let parser = CookieParser::from_config(codec(), &TokenCookieConfig::default());

        assert!(
            parser
                .parse_cookies(built(&multiple(10)))
                .expect_err("chunks are not read by the single layout")
                .is_missing()
        );
    }

    #[test]
    fn multiple_round_trip() {
        let config = multiple(10);
        let parser = CookieParser::from_config(codec(), &config);

        assert_eq!(parser.layout(), CookieLayout::Multiple);
        assert_eq!(
            parser.parse_cookies(built(&config)).expect("cookies parse"),
            TokenSet::new("A", "B", "C")
        );
    }

    #[test]
    fn removing_any_chunk_is_incomplete() {
        let config = multiple(10);
        let parser = CookieParser::from_config(codec(), &config);
        let cookies = built(&config);
        assert!(cookies.len() > 3);

        for removed in 0..cookies.len() {
            let mut partial = cookies.clone();
            partial.remove(removed);

            assert!(
                matches!(
                    parser.parse_cookies(partial),
                    Err(CookieError::IncompleteCookieChunks { .. })
                ),
                "removing chunk {removed} was not detected"
            );
        }
    }

    #[test]
    fn multiple_missing_cookie() {
        let parser = CookieParser::from_config(codec(), &multiple(10));

        assert!(
            parser
                .parse_cookies(Vec::<(String, String)>::new())
                .expect_err("nothing to parse")
                .is_missing()
        );
    }
}
