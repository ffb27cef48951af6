//! Form validation.
//!
//! Raw forms are deserialized as plain strings and turned into typed request
//! bodies here. A form that fails validation never reaches the API client;
//! the handler re-renders it with one message per offending field.

use std::collections::BTreeMap;

use secrecy::SecretString;
use serde::Deserialize;

use scamazon_core::{Address, AddressInput, Email};

use crate::api::types::{LoginRequest, RegisterRequest};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validation outcome: the typed value or the messages for each bad field.
pub type Validated<T> = Result<T, FieldErrors>;

/// Messages keyed by form field name. One message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    /// Record `message` for `field` unless the field already has one.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn require(&mut self, field: &'static str, value: &str, message: &'static str) -> String {
        let value = value.trim();
        if value.is_empty() {
            self.add(field, message);
        }
        value.to_string()
    }

    fn email(&mut self, field: &'static str, value: &str) -> Option<Email> {
        Email::parse(value)
            .map_err(|err| self.add(field, err.to_string()))
            .ok()
    }

    fn finish<T>(self, value: Option<T>) -> Validated<T> {
        match value {
            Some(value) if self.is_empty() => Ok(value),
            _ => Err(self),
        }
    }
}

/// Sign-in form.
#[derive(Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Check only the email step of the sign-in flow.
    ///
    /// # Errors
    ///
    /// Returns the field messages if the email is invalid.
    pub fn validate_email(&self) -> Validated<Email> {
        let mut errors = FieldErrors::default();
        let email = errors.email("email", &self.email);
        errors.finish(email)
    }

    /// # Errors
    ///
    /// Returns the field messages if the email is invalid or the password
    /// is missing.
    pub fn validate(self) -> Validated<LoginRequest> {
        let mut errors = FieldErrors::default();
        let email = errors.email("email", &self.email);
        if self.password.is_empty() {
            errors.add("password", "Enter your password");
        }
        errors.finish(email.map(|email| LoginRequest {
            email,
            password: SecretString::from(self.password),
        }))
    }
}

/// Account creation form.
#[derive(Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns the field messages for every invalid field.
    pub fn validate(self) -> Validated<RegisterRequest> {
        let mut errors = FieldErrors::default();
        let fullname = errors.require("fullname", &self.fullname, "Enter your name");
        let email = errors.email("email", &self.email);
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }
        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }
        errors.finish(email.map(|email| RegisterRequest {
            fullname,
            email,
            password: SecretString::from(self.password),
        }))
    }
}

/// New/edit address form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub county: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub delivery_instructions: String,
}

impl From<&Address> for AddressForm {
    fn from(address: &Address) -> Self {
        let details = &address.details;
        Self {
            full_name: details.full_name.clone(),
            address_line1: details.address_line1.clone(),
            address_line2: details.address_line2.clone(),
            city: details.city.clone(),
            postcode: details.postcode.clone(),
            county: details.county.clone(),
            country: details.country.clone(),
            phone_number: details.phone_number.clone(),
            delivery_instructions: details.delivery_instructions.clone().unwrap_or_default(),
        }
    }
}

impl AddressForm {
    /// # Errors
    ///
    /// Returns the field messages for every missing required field.
    pub fn validate(&self) -> Validated<AddressInput> {
        let mut errors = FieldErrors::default();
        let input = AddressInput {
            full_name: errors.require("full_name", &self.full_name, "Enter a full name"),
            address_line1: errors.require(
                "address_line1",
                &self.address_line1,
                "Enter the first line of the address",
            ),
            address_line2: self.address_line2.trim().to_string(),
            city: errors.require("city", &self.city, "Enter a town or city"),
            postcode: errors
                .require("postcode", &self.postcode, "Enter a postcode")
                .to_uppercase(),
            county: self.county.trim().to_string(),
            country: errors.require("country", &self.country, "Enter a country"),
            phone_number: errors.require(
                "phone_number",
                &self.phone_number,
                "Enter a phone number",
            ),
            delivery_instructions: Some(self.delivery_instructions.trim())
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        };
        errors.finish(Some(input))
    }
}
