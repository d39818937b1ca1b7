//! Client registry file format.
//!
//! The registry is a JSON array loaded once at startup:
//!
//! ```json
//! [
//!   { "clientId": "manager-1", "secret": "pm-secret", "role": "ProductManager" }
//! ]
//! ```

use std::fmt;
use std::path::Path;

use crate::error::{GateError, GateResult};

/// Role assigned when a registry entry does not name one.
pub const DEFAULT_ROLE: &str = "ProductManager";

/// One client entry from the registry.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    /// Client identifier.
    pub client_id: String,
    /// Shared secret.
    pub secret: String,
    /// Authorization role.
    #[serde(default = "default_role")]
    pub role: String,
}

impl fmt::Debug for ClientRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRecord")
            .field("client_id", &self.client_id)
            .field("secret", &"***")
            .field("role", &self.role)
            .finish()
    }
}

fn default_role() -> String {
    DEFAULT_ROLE.to_owned()
}

/// Parse a registry document.
///
/// `source` names the document in error messages.
pub fn parse_clients(json: &str, source: &str) -> GateResult<Vec<ClientRecord>> {
    let records: Vec<ClientRecord> =
        serde_json::from_str(json).map_err(|e| GateError::ParseClients {
            path: source.to_owned(),
            source: e,
        })?;

    if let Some(bad) = records
        .iter()
        .find(|r| r.client_id.trim().is_empty() || r.secret.is_empty())
    {
        return Err(GateError::Config(format!(
            "client registry {source} has an entry with an empty client id or secret ({bad:?})"
        )));
    }

    Ok(records)
}

/// Read and parse a registry file.
pub fn load_clients(path: &Path) -> GateResult<Vec<ClientRecord>> {
    let display = path.display().to_string();
    let json = std::fs::read_to_string(path).map_err(|e| GateError::ReadClients {
        path: display.clone(),
        source: e,
    })?;
    parse_clients(&json, &display)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_should_parse_clients_with_default_role() {
        let records = parse_clients(
            r#"[{"clientId":"c1","secret":"s1"},{"clientId":"c2","secret":"s2","role":"Reader"}]"#,
            "inline",
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].role, DEFAULT_ROLE);
        assert_eq!(records[1].role, "Reader");
    }

    #[test]
    fn test_should_reject_invalid_json() {
        let result = parse_clients("{not json", "inline");
        assert!(matches!(result, Err(GateError::ParseClients { .. })));
    }

    #[test]
    fn test_should_reject_empty_secret() {
        let result = parse_clients(r#"[{"clientId":"c1","secret":""}]"#, "inline");
        assert!(matches!(result, Err(GateError::Config(_))));
    }

    #[test]
    fn test_should_not_leak_secret_in_debug_output() {
        let record = ClientRecord {
            client_id: "c1".to_owned(),
            secret: "hunter2".to_owned(),
            role: DEFAULT_ROLE.to_owned(),
        };
        assert!(!format!("{record:?}").contains("hunter2"));
    }

    #[test]
    fn test_should_load_clients_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"clientId":"c1","secret":"s1","role":"ProductManager"}}]"#).unwrap();

        let records = load_clients(file.path()).unwrap();
        assert_eq!(records[0].client_id, "c1");
    }

    #[test]
    fn test_should_report_missing_file() {
        let result = load_clients(Path::new("/nonexistent/hmacgate-clients.json"));
        assert!(matches!(result, Err(GateError::ReadClients { .. })));
    }
}
