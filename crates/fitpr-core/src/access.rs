//! PIN-based client access

use std::collections::HashMap;

use fitpr_api::responses::ClientProfile;
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::AppError;

const PIN_MIN_LEN: usize = 4;
const PIN_MAX_LEN: usize = 6;

/// Check that `pin` is 4-6 ASCII digits
///
/// # Errors
/// Returns a `Validation` error naming the `pin` field.
pub fn validate_pin(pin: &str) -> Result<(), AppError> {
    let well_formed = (PIN_MIN_LEN..=PIN_MAX_LEN).contains(&pin.len())
        && pin.bytes().all(|b| b.is_ascii_digit());
    if well_formed {
        Ok(())
    } else {
        Err(AppError::validation("PIN must be 4 to 6 digits").with_details(json!({ "field": "pin" })))
    }
}

/// Compare without exiting at the first mismatch
fn pins_match(expected: &str, given: &str) -> bool {
    expected.len() == given.len()
        && expected
            .bytes()
            .zip(given.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Clients known to the service, keyed by id
#[derive(Debug, Clone, Default)]
pub struct ClientDirectory {
    clients: HashMap<String, ClientConfig>,
}

impl ClientDirectory {
    #[must_use]
    pub fn new(clients: impl IntoIterator<Item = ClientConfig>) -> Self {
        Self {
            clients: clients
                .into_iter()
                .map(|client| (client.id.clone(), client))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Look up a client
    ///
    /// # Errors
    /// Returns `NotFound` if no client has this id.
    pub fn get(&self, client_id: &str) -> Result<&ClientConfig, AppError> {
        self.clients
            .get(client_id)
            .ok_or_else(|| AppError::not_found(format!("Client {client_id} not found")))
    }

    /// Clients belonging to `trainer_id`, ordered by name
    #[must_use]
    pub fn for_trainer(&self, trainer_id: &str) -> Vec<&ClientConfig> {
        let mut clients: Vec<_> = self
            .clients
            .values()
            .filter(|client| client.trainer_id == trainer_id)
            .collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        clients
    }

    /// Verify a client's PIN
    ///
    /// # Errors
    /// `Validation` for a malformed id or PIN, `NotFound` for an unknown client,
    /// `Authorization` for an inactive client, `Authentication` for a wrong PIN.
    pub fn verify(&self, client_id: &str, pin: &str) -> Result<&ClientConfig, AppError> {
        if client_id.trim().is_empty() {
            return Err(AppError::validation("Client id is required")
                .with_details(json!({ "field": "clientId" })));
        }
        validate_pin(pin)?;

        let client = self.get(client_id)?;
        if !client.active {
            return Err(AppError::authorization("Client access has been disabled"));
        }
        if !pins_match(&client.pin, pin) {
            return Err(AppError::authentication("Incorrect PIN"));
        }

        Ok(client)
    }
}

impl From<&ClientConfig> for ClientProfile {
    fn from(client: &ClientConfig) -> Self {
        Self {
            id: client.id.clone(),
            name: client.name.clone(),
            trainer_id: client.trainer_id.clone(),
            email: client.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn client(id: &str, pin: &str, active: bool) -> ClientConfig {
        ClientConfig {
            id: id.to_string(),
            name: format!("Client {id}"),
            trainer_id: "t1".to_string(),
            email: None,
            pin: pin.to_string(),
            active,
        }
    }

    fn directory() -> ClientDirectory {
        ClientDirectory::new([client("c1", "1234", true), client("c2", "987654", false)])
    }

    #[test]
    fn test_pin_format() {
        assert!(validate_pin("1234").is_ok());
        assert!(validate_pin("123456").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("1234567").is_err());
        assert!(validate_pin("12a4").is_err());
        assert!(validate_pin("١٢٣٤").is_err());
    }

    #[test]
    fn test_verify_outcomes() {
        let directory = directory();

        assert_eq!(directory.verify("c1", "1234").unwrap().id, "c1");
        assert_eq!(directory.verify("c1", "4321").unwrap_err().kind, ErrorKind::Authentication);
        assert_eq!(directory.verify("c1", "12").unwrap_err().kind, ErrorKind::Validation);
        assert_eq!(directory.verify("", "1234").unwrap_err().kind, ErrorKind::Validation);
        assert_eq!(directory.verify("c9", "1234").unwrap_err().kind, ErrorKind::NotFound);
        assert_eq!(directory.verify("c2", "987654").unwrap_err().kind, ErrorKind::Authorization);
    }

    #[test]
    fn test_malformed_pin_names_field() {
        let err = directory().verify("c1", "abcd").unwrap_err();
        assert_eq!(err.details, Some(json!({ "field": "pin" })));
    }

    #[test]
    fn test_for_trainer_sorted() {
        let mut b = client("b", "1111", true);
        b.name = "Zed".to_string();
        let mut a = client("a", "2222", true);
        a.name = "Amy".to_string();
        let mut other = client("o", "3333", true);
        other.trainer_id = "t2".to_string();

        let directory = ClientDirectory::new([b, a, other]);
        let names: Vec<_> = directory.for_trainer("t1").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Amy", "Zed"]);
    }
}
