//! Client side of registration: form state, the session it produces, and
//! the controller that ties them to the auth endpoint.

use std::time::Duration;

use thiserror::Error;

pub mod api;
pub mod form;
pub mod session;

use api::{AuthApi, ClientError};
use form::{Field, FormError, SignupForm};
use session::{Session, SessionError, TokenStore};

pub const DASHBOARD_ROUTE: &str = "/dashboard";
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1200);
pub const SIGNUP_SUCCESS: &str = "Signup successful! Redirecting to dashboard...";

/// Where the controller sends the user next.
pub trait Navigator {
    fn navigate(&mut self, route: &str);
}

#[derive(Error, Debug)]
pub enum SignupError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mount {
    /// A session already existed; the user was sent to the dashboard.
    Redirected,
    ShowForm,
}

pub struct SignupController<A, S, N> {
    api: A,
    session: Session<S>,
    navigator: N,
    form: SignupForm,
    error: Option<String>,
    success: Option<String>,
    redirect_delay: Duration,
}

impl<A, S, N> SignupController<A, S, N>
where
    A: AuthApi,
    S: TokenStore,
    N: Navigator,
{
    pub fn new(api: A, session: Session<S>, navigator: N) -> Self {
        Self {
            api,
            session,
            navigator,
            form: SignupForm::new(),
            error: None,
            success: None,
            redirect_delay: REDIRECT_DELAY,
        }
    }

    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    /// Signed-in users never see the form.
    pub fn mount(&mut self) -> Mount {
        if self.session.is_authenticated() {
            tracing::info!("session already present, skipping signup");
            self.navigator.navigate(DASHBOARD_ROUTE);
            Mount::Redirected
        } else {
            Mount::ShowForm
        }
    }

    /// Updates one input by its name.
    pub fn update(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        let field: Field = name.parse()?;
        self.form.set(field, value)
    }

    pub fn form(&self) -> &SignupForm {
        &self.form
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Ends the stored session without going through the form.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.session.logout()
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Validates, posts once, and on success signs in and redirects after
    /// the redirect delay. Any failure is also kept as the displayed error.
    pub async fn submit(&mut self) -> Result<(), SignupError> {
        self.error = None;
        self.success = None;

        let result = self.try_submit().await;
        if let Err(e) = &result {
            tracing::warn!("signup failed: {}", e);
            self.error = Some(e.to_string());
        }
        result
    }

    async fn try_submit(&mut self) -> Result<(), SignupError> {
        let payload = self.form.to_payload()?;
        let token = self.api.register(&payload).await?;
        self.session.login(&token)?;

        self.success = Some(SIGNUP_SUCCESS.to_string());
        tracing::info!("✅ {}", SIGNUP_SUCCESS);
        tokio::time::sleep(self.redirect_delay).await;
        self.navigator.navigate(DASHBOARD_ROUTE);
        Ok(())
    }
}
