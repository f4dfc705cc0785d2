use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    task::{Context, Poll},
};

use http::{Request, Response};
use tower_cookies::{CookieManager, Cookies};
use tower_layer::Layer;
use tower_service::Service;

use crate::{
    config::TokenCookieConfig,
    cookies::TokenCookies,
    credential::RotatingCredential,
    error::CookieError,
    format::TokenSet,
};

#[derive(Debug)]
enum Pending {
    Write(TokenSet),
    Clear,
}

#[derive(Debug)]
struct SessionState {
    loaded: Result<TokenSet, CookieError>,
    pending: Option<Pending>,
}

/// Per-request view of the token cookies, inserted into request extensions by
/// [`TokenCookieLayer`].
///
/// Changes are written to the response once the inner service has returned.
#[derive(Debug, Clone)]
pub struct AuthSession {
    state: Arc<Mutex<SessionState>>,
}

impl AuthSession {
    fn new(loaded: Result<TokenSet, CookieError>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                loaded,
                pending: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The tokens as they will stand after this request.
    pub fn tokens(&self) -> Option<TokenSet> {
        let state = self.lock();
        match &state.pending {
            Some(Pending::Write(tokens)) => Some(tokens.clone()),
            Some(Pending::Clear) => None,
            None => state.loaded.as_ref().ok().cloned(),
        }
    }

    /// Why the request's cookies did not yield tokens, if they did not.
    pub fn load_error(&self) -> Option<CookieError> {
        self.lock().loaded.as_ref().err().cloned()
    }

    pub fn set_tokens(&self, tokens: TokenSet) {
        self.lock().pending = Some(Pending::Write(tokens));
    }

    pub fn clear(&self) {
        self.lock().pending = Some(Pending::Clear);
    }

    pub fn is_modified(&self) -> bool {
        self.lock().pending.is_some()
    }

    fn take_pending(&self) -> Option<Pending> {
        self.lock().pending.take()
    }
}

#[derive(Debug, Clone)]
pub struct TokenCookieLayer {
    cookies: TokenCookies,
}

impl TokenCookieLayer {
    #[must_use]
    pub fn new(credential: RotatingCredential) -> Self {
        Self {
            cookies: TokenCookies::new(TokenCookieConfig::default(), credential),
        }
    }

    #[must_use]
    pub fn with_config(self, config: TokenCookieConfig) -> Self {
        let credential = self.cookies.credential().clone();
        Self {
            cookies: TokenCookies::new(config, credential),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenCookieManager<S> {
    inner: S,
    cookies: TokenCookies,
}

impl<S> Layer<S> for TokenCookieLayer {
    type Service = CookieManager<TokenCookieManager<S>>;

    fn layer(&self, inner: S) -> Self::Service {
        CookieManager::new(TokenCookieManager {
            inner,
            cookies: self.cookies.clone(),
        })
    }
}

fn internal_error<B: Default>() -> Response<B> {
    let mut res = Response::default();
    *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
    res
}

impl<ReqBody, ResBody, S> Service<Request<ReqBody>> for TokenCookieManager<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Default + Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let token_cookies = self.cookies.clone();

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let Some(mut cookies) = req.extensions().get::<Cookies>().cloned() else {
                return Ok(internal_error());
            };

            let loaded = token_cookies.read_request(req.headers());
            match &loaded {
                Ok(_) => {}
                Err(err) if err.is_missing() => {
                    tracing::trace!("request carries no token cookie");
                }
                Err(err) => {
                    tracing::warn!(err = %err, kind = err.kind(), "token cookie decode failed");
                    if token_cookies.config().clear_on_decode_error {
                        token_cookies.remove(&mut cookies);
                    }
                }
            }

            let session = AuthSession::new(loaded);
            req.extensions_mut().insert(session.clone());

            let res = inner.call(req).await?;

            match session.take_pending() {
                Some(Pending::Write(tokens)) if !res.status().is_server_error() => {
                    if let Err(err) = token_cookies.write(&mut cookies, &tokens) {
                        tracing::error!(err = %err, "token cookie encode failed");
                        return Ok(internal_error());
                    }
                }
                Some(Pending::Write(_)) => {}
                Some(Pending::Clear) => token_cookies.remove(&mut cookies),
                None => {}
            }

            Ok(res)
        })
    }
}
