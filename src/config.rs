use std::borrow::Cow;

use time::{Duration, OffsetDateTime};
use tower_cookies::Cookie;

use crate::{SameSite, encoding::EncodingOptions, signing::Secret};

#[derive(Debug, Clone)]
pub struct CookieSessionConfig {
    pub(crate) name: Cow<'static, str>,
    pub(crate) http_only: bool,
    pub(crate) same_site: SameSite,
    pub(crate) secure: bool,
    pub(crate) path: Cow<'static, str>,
    pub(crate) domain: Option<Cow<'static, str>>,
    pub(crate) max_age: Option<Duration>,
    pub(crate) expires: Option<OffsetDateTime>,
    pub(crate) partitioned: bool,
    pub(crate) secrets: Vec<Secret>,
    pub(crate) omit_sign_prefix: bool,
    pub(crate) encoding: EncodingOptions,
    pub(crate) max_cookie_bytes: usize,
    pub(crate) always_save: bool,
    pub(crate) clear_on_decode_error: bool,
}

impl Default for CookieSessionConfig {
    fn default() -> Self {
        Self {
            name: "session".into(),
            http_only: true,
            same_site: SameSite::Lax,
            secure: true,
            path: "/".into(),
            domain: None,
            max_age: None,
            expires: None,
            partitioned: false,
            secrets: Vec::new(),
            omit_sign_prefix: false,
            encoding: EncodingOptions::Disabled,
            max_cookie_bytes: 4096,
            always_save: false,
            clear_on_decode_error: true,
        }
    }
}

impl CookieSessionConfig {
    #[must_use]
    pub fn with_name<N: Into<Cow<'static, str>>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn with_path<P: Into<Cow<'static, str>>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_domain<D: Into<Cow<'static, str>>>(mut self, domain: D) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn without_domain(mut self) -> Self {
        self.domain = None;
        self
    }

    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    #[must_use]
    pub fn with_expires(mut self, expires: OffsetDateTime) -> Self {
        self.expires = Some(expires);
        self
    }

    #[must_use]
    pub fn with_partitioned(mut self, partitioned: bool) -> Self {
        self.partitioned = partitioned;
        self
    }

    /// Appends a trusted secret. The first secret added signs; every secret verifies.
    #[must_use]
    pub fn with_secret<S: Into<Secret>>(mut self, secret: S) -> Self {
        self.secrets.push(secret.into());
        self
    }

    /// Replaces the trusted secrets, newest first.
    #[must_use]
    pub fn with_secrets<I, S>(mut self, secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Secret>,
    {
        self.secrets = secrets.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_omit_sign_prefix(mut self, omit_sign_prefix: bool) -> Self {
        self.omit_sign_prefix = omit_sign_prefix;
        self
    }

    #[must_use]
    pub fn with_encoding<E: Into<EncodingOptions>>(mut self, encoding: E) -> Self {
        self.encoding = encoding.into();
        self
    }

    #[must_use]
    pub fn with_max_cookie_bytes(mut self, max_cookie_bytes: usize) -> Self {
        self.max_cookie_bytes = max_cookie_bytes;
        self
    }

    #[must_use]
    pub fn with_always_save(mut self, always_save: bool) -> Self {
        self.always_save = always_save;
        self
    }

    #[must_use]
    pub fn with_clear_on_decode_error(mut self, clear_on_decode_error: bool) -> Self {
        self.clear_on_decode_error = clear_on_decode_error;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn secrets(&self) -> &[Secret] {
        &self.secrets
    }

    pub(crate) fn build_cookie(&self, value: String, expire_now: bool) -> Cookie<'static> {
        let mut cookie_builder = Cookie::build((self.name.clone(), value))
            .http_only(self.http_only)
            .same_site(self.same_site)
            .secure(self.secure)
            .path(self.path.clone())
            .partitioned(self.partitioned);

        if expire_now {
            cookie_builder = cookie_builder.max_age(Duration::ZERO);
        } else {
            if let Some(max_age) = self.max_age {
                cookie_builder = cookie_builder.max_age(max_age);
            }
            if let Some(expires) = self.expires {
                cookie_builder = cookie_builder.expires(expires);
            }
        }

        if let Some(domain) = self.domain.clone() {
            cookie_builder = cookie_builder.domain(domain);
        }

        cookie_builder.build()
    }

    pub(crate) fn apply_removal_attributes(&self, cookie: &mut Cookie<'static>) {
        cookie.set_path(self.path.clone());
        if let Some(domain) = self.domain.clone() {
            cookie.set_domain(domain);
        }
    }
}
