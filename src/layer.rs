use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use http::{Request, Response};
use tower_cookies::{CookieManager, Cookies};
use tower_layer::Layer;
use tower_service::Service;

use crate::{
    config::CookieSessionConfig, error::Result, session::Session, source::CookieSource,
    storage::CookieSessionStorage,
};

/// Layer that loads the session cookie into a [`Session`] request extension and writes it back
/// when the handler changed it.
#[derive(Debug, Clone)]
pub struct CookieSessionLayer {
    storage: Arc<CookieSessionStorage>,
}

impl CookieSessionLayer {
    #[must_use]
    pub fn new(storage: CookieSessionStorage) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// Builds the storage from `config` and wraps it in a layer.
    pub fn from_config(config: CookieSessionConfig) -> Result<Self> {
        Ok(Self::new(CookieSessionStorage::new(config)?))
    }

    pub fn storage(&self) -> &CookieSessionStorage {
        &self.storage
    }
}

#[derive(Debug, Clone)]
pub struct CookieSessionManager<S> {
    inner: S,
    storage: Arc<CookieSessionStorage>,
}

impl<S> Layer<S> for CookieSessionLayer {
    type Service = CookieManager<CookieSessionManager<S>>;

    fn layer(&self, inner: S) -> Self::Service {
        CookieManager::new(CookieSessionManager {
            inner,
            storage: self.storage.clone(),
        })
    }
}

fn internal_error<B: Default>() -> Response<B> {
    let mut res = Response::default();
    *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
    res
}

impl<ReqBody, ResBody, S> Service<Request<ReqBody>> for CookieSessionManager<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Default + Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let storage = self.storage.clone();

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let Some(cookies) = req.extensions().get::<Cookies>().cloned() else {
                tracing::error!("cookie session layer requires the cookie manager extension");
                return Ok(internal_error());
            };
            let config = storage.config();

            let raw = cookies
                .cookie_value(config.name())
                .filter(|raw| !raw.is_empty());
            let had_cookie = raw.is_some();

            let data = match raw.as_deref() {
                Some(raw) => match storage.try_session_from_value(raw) {
                    Ok(data) => data,
                    Err(err) => {
                        tracing::warn!(
                            stage = err.stage(),
                            err = %err,
                            "cookie session decode failed"
                        );
                        if config.clear_on_decode_error {
                            storage.remove_cookie(&cookies);
                        }
                        Default::default()
                    }
                },
                None => Default::default(),
            };

            let session = Session::new(data);
            req.extensions_mut().insert(session.clone());

            let res = inner.call(req).await?;

            if session.is_destroyed() {
                if let Err(err) = storage.delete_cookie(&cookies, &session.snapshot()) {
                    tracing::error!(err = %err, "cookie session destroy failed");
                    return Ok(internal_error());
                }
                return Ok(res);
            }

            if !(session.is_modified() || config.always_save) || res.status().is_server_error() {
                return Ok(res);
            }

            if session.is_empty() {
                if had_cookie {
                    storage.remove_cookie(&cookies);
                }
                return Ok(res);
            }

            if let Err(err) = storage.set_cookie(&cookies, &session.snapshot()) {
                tracing::error!(err = %err, "cookie session save failed");
                return Ok(internal_error());
            }

            Ok(res)
        })
    }
}
