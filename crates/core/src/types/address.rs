//! Delivery addresses and the address book.
//!
//! At most one address in a book is the default. Every mutation that can set
//! the flag goes through [`AddressBook`], which clears the previous default in
//! the same step.

use serde::{Deserialize, Serialize};

use crate::types::id::AddressId;

/// A saved delivery address, as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address_id: AddressId,
    #[serde(flatten)]
    pub details: AddressInput,
    #[serde(default)]
    pub is_default: bool,
}

/// The user-editable fields of an address (create and update payloads).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    pub full_name: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub city: String,
    pub postcode: String,
    #[serde(default)]
    pub county: String,
    pub country: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_instructions: Option<String>,
}

/// The signed-in user's saved addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressBook {
    addresses: Vec<Address>,
}

impl AddressBook {
    /// Build a book from backend records.
    ///
    /// If the records claim more than one default, the last one wins so the
    /// book always satisfies the single-default rule.
    #[must_use]
    pub fn from_addresses(addresses: Vec<Address>) -> Self {
        let last_default = addresses
            .iter()
            .rev()
            .find(|address| address.is_default)
            .map(|address| address.address_id);

        let mut book = Self { addresses };
        if let Some(id) = last_default {
            book.set_default(id);
        }
        book
    }

    /// Make `id` the only default address.
    ///
    /// Returns `false` and leaves the book untouched if `id` is unknown.
    pub fn set_default(&mut self, id: AddressId) -> bool {
        if !self.contains(id) {
            return false;
        }
        for address in &mut self.addresses {
            address.is_default = address.address_id == id;
        }
        true
    }

    /// Insert or replace an address by id.
    pub fn upsert(&mut self, address: Address) {
        let id = address.address_id;
        let is_default = address.is_default;
        match self.addresses.iter_mut().find(|a| a.address_id == id) {
            Some(existing) => *existing = address,
            None => self.addresses.push(address),
        }
        if is_default {
            self.set_default(id);
        }
    }

    /// Remove the address with `id`, returning it if present.
    pub fn remove(&mut self, id: AddressId) -> Option<Address> {
        let index = self.addresses.iter().position(|a| a.address_id == id)?;
        Some(self.addresses.remove(index))
    }

    #[must_use]
    pub fn contains(&self, id: AddressId) -> bool {
        self.addresses.iter().any(|a| a.address_id == id)
    }

    #[must_use]
    pub fn get(&self, id: AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| a.address_id == id)
    }

    /// The current default address, if any.
    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }

    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address(id: i64, is_default: bool) -> Address {
        Address {
            address_id: AddressId::new(id),
            details: AddressInput {
                full_name: format!("Resident {id}"),
                address_line1: format!("{id} High Street"),
                city: "Leeds".to_string(),
                postcode: "LS1 1AA".to_string(),
                country: "United Kingdom".to_string(),
                phone_number: "0113 000 0000".to_string(),
                ..AddressInput::default()
            },
            is_default,
        }
    }

    fn defaults(book: &AddressBook) -> Vec<i64> {
        book.addresses()
            .iter()
            .filter(|a| a.is_default)
            .map(|a| a.address_id.as_i64())
            .collect()
    }

    #[test]
    fn test_set_default_is_exclusive() {
        let mut book = AddressBook::from_addresses(vec![
            address(1, true),
            address(2, false),
            address(3, false),
        ]);

        assert!(book.set_default(AddressId::new(3)));
        assert_eq!(defaults(&book), vec![3]);

        assert!(book.set_default(AddressId::new(2)));
        assert_eq!(defaults(&book), vec![2]);
    }

    #[test]
    fn test_set_default_unknown_id_is_rejected() {
        let mut book = AddressBook::from_addresses(vec![address(1, true)]);
        assert!(!book.set_default(AddressId::new(42)));
        assert_eq!(defaults(&book), vec![1]);
    }

    #[test]
    fn test_from_addresses_repairs_multiple_defaults() {
        let book = AddressBook::from_addresses(vec![address(1, true), address(2, true)]);
        assert_eq!(defaults(&book), vec![2]);
    }

    #[test]
    fn test_upsert_default_clears_previous() {
        let mut book = AddressBook::from_addresses(vec![address(1, true), address(2, false)]);
        book.upsert(address(3, true));
        assert_eq!(defaults(&book), vec![3]);
        assert_eq!(book.addresses().len(), 3);
    }

    #[test]
    fn test_remove() {
        let mut book = AddressBook::from_addresses(vec![address(1, true), address(2, false)]);
        assert!(book.remove(AddressId::new(1)).is_some());
        assert!(book.remove(AddressId::new(1)).is_none());
        assert!(book.default_address().is_none());
    }

    #[test]
    fn test_wire_format_is_flat() {
        let json = serde_json::to_value(address(5, true)).unwrap();
        assert_eq!(json["address_id"], 5);
        assert_eq!(json["city"], "Leeds");
        assert_eq!(json["is_default"], true);
        assert!(json.get("details").is_none());
    }
}
