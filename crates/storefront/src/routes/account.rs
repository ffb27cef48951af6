//! Account route handlers.
//!
//! All routes here require a signed-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::instrument;

use scamazon_core::{Address, AddressId};

use super::PageHeader;
use crate::content::{ACCOUNT_OPTIONS, AccountOption};
use crate::error::AppError;
use crate::filters;
use crate::lifecycle::ViewScope;
use crate::middleware::RequireUser;
use crate::session::ClientSession;
use crate::state::AppState;
use crate::store::addresses;
use crate::validation::{AddressForm, FieldErrors};

/// Notice shown after the default address changes.
pub const DEFAULT_CHANGED: &str = "Default address changed";

const LOAD_FAILED: &str = "Failed to load your addresses. Please try again later.";
const SAVE_FAILED: &str = "We couldn't save this address. Please try again.";

// =============================================================================
// View Types
// =============================================================================

/// An address card.
#[derive(Clone)]
pub struct AddressCardView {
    pub id: AddressId,
    pub full_name: String,
    pub lines: Vec<String>,
    pub phone_number: String,
    pub delivery_instructions: Option<String>,
    pub is_default: bool,
}

impl From<&Address> for AddressCardView {
    fn from(address: &Address) -> Self {
        let details = &address.details;
        let town = [details.city.as_str(), details.county.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let lines = [
            details.address_line1.clone(),
            details.address_line2.clone(),
            town,
            details.postcode.clone(),
            details.country.clone(),
        ]
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect();

        Self {
            id: address.address_id,
            full_name: details.full_name.clone(),
            lines,
            phone_number: details.phone_number.clone(),
            delivery_instructions: details.delivery_instructions.clone(),
            is_default: address.is_default,
        }
    }
}

/// One input on the address form.
#[derive(Clone)]
pub struct FormFieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
    pub error: Option<String>,
}

/// Build the address form's inputs from submitted values and errors.
fn address_fields(form: &AddressForm, errors: &FieldErrors) -> Vec<FormFieldView> {
    let field = |name: &'static str, label: &'static str, value: &str, required: bool| FormFieldView {
        name,
        label,
        value: value.to_string(),
        required,
        error: errors.get(name).map(String::from),
    };
    vec![
        field("full_name", "Full name", &form.full_name, true),
        field("address_line1", "Address line 1", &form.address_line1, true),
        field("address_line2", "Address line 2", &form.address_line2, false),
        field("city", "Town/City", &form.city, true),
        field("county", "County", &form.county, false),
        field("postcode", "Postcode", &form.postcode, true),
        field("country", "Country", &form.country, true),
        field("phone_number", "Phone number", &form.phone_number, true),
        field(
            "delivery_instructions",
            "Delivery instructions",
            &form.delivery_instructions,
            false,
        ),
    ]
}

// =============================================================================
// Templates
// =============================================================================

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub header: PageHeader,
    pub options: &'static [AccountOption],
}

/// Address book template.
#[derive(Template, WebTemplate)]
#[template(path = "addresses.html")]
pub struct AddressesTemplate {
    pub header: PageHeader,
    pub addresses: Vec<AddressCardView>,
    pub notice: Option<&'static str>,
    pub error: Option<&'static str>,
}

/// New/edit address form template.
#[derive(Template, WebTemplate)]
#[template(path = "address_form.html")]
pub struct AddressFormTemplate {
    pub header: PageHeader,
    pub heading: &'static str,
    pub action: String,
    pub fields: Vec<FormFieldView>,
    pub error: Option<&'static str>,
}

impl AddressFormTemplate {
    fn new_address(client: &ClientSession, form: &AddressForm, errors: &FieldErrors) -> Self {
        Self {
            header: client.store.select(PageHeader::from_state),
            heading: "Add a new address",
            action: "/account/addresses/new".to_string(),
            fields: address_fields(form, errors),
            error: None,
        }
    }

    fn edit_address(
        client: &ClientSession,
        id: AddressId,
        form: &AddressForm,
        errors: &FieldErrors,
    ) -> Self {
        Self {
            header: client.store.select(PageHeader::from_state),
            heading: "Edit your address",
            action: format!("/account/addresses/{id}/edit"),
            fields: address_fields(form, errors),
            error: None,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the account overview.
#[instrument(skip(client))]
pub async fn index(RequireUser { client, .. }: RequireUser) -> AccountTemplate {
    let _view = ViewScope::mount("account", &client.notices);
    AccountTemplate {
        header: client.store.select(PageHeader::from_state),
        options: ACCOUNT_OPTIONS,
    }
}

/// Display the address book.
#[instrument(skip(state, client))]
pub async fn addresses(
    State(state): State<AppState>,
    RequireUser { client, .. }: RequireUser,
) -> Response {
    let mut scope = ViewScope::mount("addresses", &client.notices);
    scope.spawn(addresses::fetch_addresses(
        client.store.clone(),
        state.api().clone(),
    ));
    let failed = !scope.settle().await.is_empty();
    let notice = scope.notice(Utc::now()).map(|notice| notice.message);

    let template = client.store.select(|s| AddressesTemplate {
        header: PageHeader::from_state(s),
        addresses: s
            .addresses
            .book()
            .addresses()
            .iter()
            .map(AddressCardView::from)
            .collect(),
        notice,
        error: failed.then_some(LOAD_FAILED),
    });

    if failed {
        (StatusCode::BAD_GATEWAY, template).into_response()
    } else {
        template.into_response()
    }
}

/// Display the new address form.
#[instrument(skip(client))]
pub async fn new_address(RequireUser { client, .. }: RequireUser) -> AddressFormTemplate {
    let _view = ViewScope::mount("address_form", &client.notices);
    AddressFormTemplate::new_address(&client, &AddressForm::default(), &FieldErrors::default())
}

/// Handle the new address form.
#[instrument(skip(state, client, form))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireUser { client, .. }: RequireUser,
    Form(form): Form<AddressForm>,
) -> Response {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let template = AddressFormTemplate::new_address(&client, &form, &errors);
            return (StatusCode::UNPROCESSABLE_ENTITY, template).into_response();
        }
    };

    match addresses::create_address(client.store.clone(), state.api().clone(), input).await {
        Ok(()) => Redirect::to("/account/addresses").into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to create address");
            let mut template =
                AddressFormTemplate::new_address(&client, &form, &FieldErrors::default());
            template.error = Some(SAVE_FAILED);
            (StatusCode::BAD_GATEWAY, template).into_response()
        }
    }
}

/// Display the edit form for an address.
#[instrument(skip(state, client))]
pub async fn edit_address(
    State(state): State<AppState>,
    RequireUser { client, .. }: RequireUser,
    Path(id): Path<AddressId>,
) -> Result<AddressFormTemplate, AppError> {
    let mut scope = ViewScope::mount("address_form", &client.notices);
    if !client.store.select(|s| s.addresses.book().contains(id)) {
        scope.spawn(addresses::fetch_addresses(
            client.store.clone(),
            state.api().clone(),
        ));
        if let Some(err) = scope.settle().await.into_iter().next() {
            return Err(err.into());
        }
    }

    let form = client
        .store
        .select(|s| s.addresses.book().get(id).map(AddressForm::from))
        .ok_or_else(|| AppError::NotFound(format!("address {id}")))?;

    Ok(AddressFormTemplate::edit_address(
        &client,
        id,
        &form,
        &FieldErrors::default(),
    ))
}

/// Handle the edit address form.
#[instrument(skip(state, client, form))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireUser { client, .. }: RequireUser,
    Path(id): Path<AddressId>,
    Form(form): Form<AddressForm>,
) -> Response {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let template = AddressFormTemplate::edit_address(&client, id, &form, &errors);
            return (StatusCode::UNPROCESSABLE_ENTITY, template).into_response();
        }
    };

    match addresses::update_address(client.store.clone(), state.api().clone(), id, input).await {
        Ok(()) => Redirect::to("/account/addresses").into_response(),
        Err(err) => {
            tracing::warn!(error = %err, address_id = %id, "failed to update address");
            let mut template =
                AddressFormTemplate::edit_address(&client, id, &form, &FieldErrors::default());
            template.error = Some(SAVE_FAILED);
            (StatusCode::BAD_GATEWAY, template).into_response()
        }
    }
}

/// Remove an address.
#[instrument(skip(state, client))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireUser { client, .. }: RequireUser,
    Path(id): Path<AddressId>,
) -> Result<Redirect, AppError> {
    addresses::delete_address(client.store.clone(), state.api().clone(), id).await?;
    Ok(Redirect::to("/account/addresses"))
}

/// Make an address the default and show the "changed" notice.
#[instrument(skip(state, client))]
pub async fn set_default_address(
    State(state): State<AppState>,
    RequireUser { client, .. }: RequireUser,
    Path(id): Path<AddressId>,
) -> Result<Redirect, AppError> {
    let scope = ViewScope::mount("addresses", &client.notices);
    addresses::set_default_address(client.store.clone(), state.api().clone(), id).await?;
    scope.flash(DEFAULT_CHANGED, Utc::now());
    Ok(Redirect::to("/account/addresses"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use scamazon_core::AddressInput;

    use super::*;

    fn address() -> Address {
        Address {
            address_id: AddressId::new(5),
            details: AddressInput {
                full_name: "Ada Lovelace".to_string(),
                address_line1: "12 St James's Square".to_string(),
                address_line2: String::new(),
                city: "London".to_string(),
                postcode: "SW1Y 4JH".to_string(),
                county: "Greater London".to_string(),
                country: "United Kingdom".to_string(),
                phone_number: "020 7946 0000".to_string(),
                delivery_instructions: Some("Leave with porter".to_string()),
            },
            is_default: true,
        }
    }

    #[test]
    fn test_address_card_skips_blank_lines() {
        let card = AddressCardView::from(&address());
        assert_eq!(
            card.lines,
            vec![
                "12 St James's Square",
                "London, Greater London",
                "SW1Y 4JH",
                "United Kingdom"
            ]
        );
        assert!(card.is_default);
    }

    #[test]
    fn test_form_fields_carry_values_and_errors() {
        let form = AddressForm::from(&address());
        let mut errors = FieldErrors::default();
        errors.add("city", "Enter a town or city");

        let fields = address_fields(&form, &errors);
        let city = fields.iter().find(|f| f.name == "city").unwrap();
        assert_eq!(city.value, "London");
        assert_eq!(city.error.as_deref(), Some("Enter a town or city"));
        assert!(fields.iter().filter(|f| f.name != "city").all(|f| f.error.is_none()));
    }
}
