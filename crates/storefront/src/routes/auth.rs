//! Authentication route handlers.
//!
//! Sign-in is a two-step portal: the email step, then the password step with
//! a "Change" button back to the first. Registration does not sign the
//! shopper in; it redirects to the portal with a confirmation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::PageHeader;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::lifecycle::ViewScope;
use crate::middleware::Client;
use crate::session::ClientSession;
use crate::state::AppState;
use crate::store::user;
use crate::validation::{FieldErrors, LoginForm, RegisterForm};

const SIGNIN_FAILED: &str = "We couldn't sign you in with that email and password.";
const REGISTER_FAILED: &str = "We couldn't create your account. Please try again.";
const REGISTERED: &str = "Account created. Sign in to continue.";

// =============================================================================
// Form Types
// =============================================================================

/// Which part of the sign-in portal submitted the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigninStep {
    #[default]
    Email,
    Password,
    Change,
}

/// Sign-in portal form data.
#[derive(Default, Deserialize)]
pub struct SigninForm {
    #[serde(default)]
    pub step: SigninStep,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-in portal template.
#[derive(Template, WebTemplate)]
#[template(path = "signin.html")]
pub struct SigninTemplate {
    pub header: PageHeader,
    /// `true` renders the password step.
    pub password_step: bool,
    pub email: String,
    pub email_error: Option<String>,
    pub password_error: Option<String>,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
    pub loading: bool,
}

impl SigninTemplate {
    fn email_step(client: &ClientSession, email: String) -> Self {
        client.store.select(|s| Self {
            header: PageHeader::from_state(s),
            password_step: false,
            email,
            email_error: None,
            password_error: None,
            error: None,
            success: None,
            loading: s.user.meta().is_loading(),
        })
    }

    fn password_step(client: &ClientSession, email: String) -> Self {
        Self {
            password_step: true,
            ..Self::email_step(client, email)
        }
    }

    fn with_errors(mut self, errors: &FieldErrors) -> Self {
        self.email_error = errors.get("email").map(String::from);
        self.password_error = errors.get("password").map(String::from);
        self
    }
}

/// A registration form input.
#[derive(Clone)]
pub struct RegisterFieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: &'static str,
    pub value: String,
    pub error: Option<String>,
}

/// Registration template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub header: PageHeader,
    pub fields: Vec<RegisterFieldView>,
    pub error: Option<&'static str>,
    pub loading: bool,
}

impl RegisterTemplate {
    /// Passwords are never echoed back.
    fn new(client: &ClientSession, fullname: &str, email: &str, errors: &FieldErrors) -> Self {
        let field = |name: &'static str,
                     label: &'static str,
                     kind: &'static str,
                     value: &str| RegisterFieldView {
            name,
            label,
            kind,
            value: value.to_string(),
            error: errors.get(name).map(String::from),
        };
        client.store.select(|s| Self {
            header: PageHeader::from_state(s),
            fields: vec![
                field("fullname", "Your name", "text", fullname),
                field("email", "Email", "email", email),
                field("password", "Password", "password", ""),
                field("confirm_password", "Re-enter password", "password", ""),
            ],
            error: None,
            loading: s.user.meta().is_loading(),
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the sign-in portal at the email step.
#[instrument(skip(client))]
pub async fn signin_page(Client(client): Client) -> Response {
    if client.store.select(|s| s.user.is_logged_in()) {
        return Redirect::to("/").into_response();
    }

    let _view = ViewScope::mount("signin", &client.notices);
    let mut template = SigninTemplate::email_step(&client, String::new());
    if client.store.select(|s| s.user.just_registered()) {
        template.success = Some(REGISTERED);
    }
    template.into_response()
}

/// Handle a sign-in portal submission.
#[instrument(skip(state, client, form), fields(step = ?form.step))]
pub async fn signin(
    State(state): State<AppState>,
    Client(client): Client,
    Form(form): Form<SigninForm>,
) -> Response {
    let login = LoginForm {
        email: form.email,
        password: form.password,
    };

    match form.step {
        SigninStep::Change => SigninTemplate::email_step(&client, login.email).into_response(),
        SigninStep::Email => match login.validate_email() {
            Ok(email) => SigninTemplate::password_step(&client, email.into_inner()).into_response(),
            Err(errors) => {
                let template =
                    SigninTemplate::email_step(&client, login.email).with_errors(&errors);
                (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
            }
        },
        SigninStep::Password => {
            let email = login.email.clone();
            let request = match login.validate() {
                Ok(request) => request,
                Err(errors) => {
                    let template = if errors.get("email").is_some() {
                        SigninTemplate::email_step(&client, email)
                    } else {
                        SigninTemplate::password_step(&client, email)
                    };
                    return (StatusCode::UNPROCESSABLE_ENTITY, template.with_errors(&errors))
                        .into_response();
                }
            };

            match user::login_user(client.store.clone(), state.api().clone(), request).await {
                Ok(()) => {
                    if let Some(user) = client.store.select(|s| s.user.current_user().cloned()) {
                        set_sentry_user(&user.id, Some(user.email.as_str()));
                        tracing::info!(user_id = %user.id, "shopper signed in");
                    }
                    Redirect::to("/").into_response()
                }
                Err(err) => {
                    tracing::warn!(error = %err, "sign-in failed");
                    let mut template = SigninTemplate::password_step(&client, email);
                    template.error = Some(SIGNIN_FAILED);
                    (StatusCode::UNAUTHORIZED, template).into_response()
                }
            }
        }
    }
}

/// Display the registration form.
#[instrument(skip(client))]
pub async fn register_page(Client(client): Client) -> RegisterTemplate {
    let _view = ViewScope::mount("register", &client.notices);
    RegisterTemplate::new(&client, "", "", &FieldErrors::default())
}

/// Handle the registration form.
#[instrument(skip(state, client, form))]
pub async fn register(
    State(state): State<AppState>,
    Client(client): Client,
    Form(form): Form<RegisterForm>,
) -> Response {
    let fullname = form.fullname.clone();
    let email = form.email.clone();

    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            let template = RegisterTemplate::new(&client, &fullname, &email, &errors);
            return (StatusCode::UNPROCESSABLE_ENTITY, template).into_response();
        }
    };

    match user::register_user(client.store.clone(), state.api().clone(), request).await {
        Ok(()) => Redirect::to("/signin").into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "registration failed");
            let mut template =
                RegisterTemplate::new(&client, &fullname, &email, &FieldErrors::default());
            template.error = Some(REGISTER_FAILED);
            (StatusCode::BAD_GATEWAY, template).into_response()
        }
    }
}

/// Sign out and return to the home page.
///
/// The browser session is flushed too, so the next visit starts with a fresh
/// client store.
#[instrument(skip(state, client, session))]
pub async fn signout(
    State(state): State<AppState>,
    Client(client): Client,
    session: Session,
) -> Response {
    match user::logout_user(client.store.clone(), state.api().clone()).await {
        Ok(()) => {
            clear_sentry_user();
            match Client::id(&session).await {
                Ok(id) => state.sessions().forget(id).await,
                Err(e) => tracing::error!("Failed to read client id: {}", e),
            }
            if let Err(e) = session.flush().await {
                tracing::error!("Failed to flush session: {}", e);
            }
            Redirect::to("/").into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "sign-out failed");
            AppError::from(err).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_signin_step_defaults_to_email() {
        let form: SigninForm = serde_json::from_value(serde_json::json!({
            "step": "password",
            "email": "a@b.com",
            "password": "x"
        }))
        .unwrap();
        assert_eq!(form.step, SigninStep::Password);

        let form: SigninForm =
            serde_json::from_value(serde_json::json!({"email": "a@b.com"})).unwrap();
        assert_eq!(form.step, SigninStep::Email);
    }

    #[test]
    fn test_register_template_never_echoes_passwords() {
        let client = ClientSession::default();
        let mut errors = FieldErrors::default();
        errors.add("confirm_password", "Passwords do not match");

        let template = RegisterTemplate::new(&client, "Ada", "ada@example.com", &errors);
        let password = template.fields.iter().find(|f| f.name == "password").unwrap();
        assert_eq!(password.value, "");
        let confirm = template
            .fields
            .iter()
            .find(|f| f.name == "confirm_password")
            .unwrap();
        assert_eq!(confirm.error.as_deref(), Some("Passwords do not match"));
        assert_eq!(template.fields[0].value, "Ada");
    }
}
