use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::Deserialize;
use serde_json::Value;
use ureq::Agent;

use crate::{
    api::client::new_agent,
    core::{
        dataset::{Address, Owner},
        session::ChargingSession,
    },
    prelude::*,
    quantity::energy::KilowattHours,
};

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Wallbox charging session export.
pub struct Api {
    client: Agent,
    export_url: String,
}

impl Api {
    pub fn new(export_url: String) -> Self {
        Self { client: new_agent(), export_url }
    }

    #[instrument(skip_all)]
    pub fn get_sessions(&self) -> Result<SessionExport> {
        info!("fetching the charging sessions…");
        let response = self
            .client
            .get(&self.export_url)
            .call()
            .context("failed to request the session export")?
            .body_mut()
            .read_json::<Response>()
            .context("failed to deserialize the session export")?;
        let export = SessionExport::try_from(response)?;
        info!(n_sessions = export.sessions.len(), "fetched");
        Ok(export)
    }
}

#[must_use]
pub struct SessionExport {
    /// Column keys in the export order.
    pub columns: Vec<String>,

    pub sessions: Vec<ChargingSession>,
    pub address: Option<Address>,
    pub owner: Option<Owner>,
}

impl TryFrom<Response> for SessionExport {
    type Error = Error;

    fn try_from(response: Response) -> Result<Self> {
        let keys: Vec<String> = response.columns.into_iter().map(|column| column.key).collect();
        let mut sessions = Vec::with_capacity(response.data.len());
        for (index, row) in response.data.into_iter().enumerate() {
            let session =
                parse_row(&keys, row).with_context(|| format!("malformed session row #{index}"))?;
            if session.start > session.end {
                warn!(index, start = %session.start, end = %session.end, "skipping a session ending before it starts");
                continue;
            }
            sessions.push(session);
        }
        Ok(Self {
            columns: keys,
            sessions,
            address: response.address.map(Into::into),
            owner: response.owner.map(Into::into),
        })
    }
}

fn parse_row(keys: &[String], row: Vec<Value>) -> Result<ChargingSession> {
    let mut cells: BTreeMap<&str, Value> =
        keys.iter().map(String::as_str).zip(row).collect();
    let start = parse_timestamp(cells.remove("start"), "start")?;
    let end = parse_timestamp(cells.remove("end"), "end")?;
    let energy = parse_energy(cells.remove("energy"))?;
    let identifier = cells.remove("id_chip_name").and_then(into_text);
    let extra: BTreeMap<String, String> = cells
        .into_iter()
        .filter_map(|(key, value)| into_text(value).map(|text| (key.to_owned(), text)))
        .collect();
    Ok(ChargingSession::builder()
        .start(start)
        .end(end)
        .energy(energy)
        .maybe_identifier(identifier)
        .extra(extra)
        .build())
}

fn parse_timestamp(cell: Option<Value>, key: &str) -> Result<DateTime<Local>> {
    let Some(Value::String(text)) = cell else {
        bail!("`{key}` is missing or not a string");
    };
    let naive = NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
        .with_context(|| format!("invalid `{key}` timestamp: `{text}`"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("`{text}` does not exist in the local time zone"))
}

fn parse_energy(cell: Option<Value>) -> Result<KilowattHours> {
    let energy = match cell {
        Some(Value::Number(number)) => number.as_f64().context("`energy` is out of range")?,
        Some(Value::String(text)) => {
            text.trim().parse().with_context(|| format!("invalid `energy`: `{text}`"))?
        }
        _ => bail!("`energy` is missing or not a number"),
    };
    ensure!(energy >= 0.0, "negative `energy`: {energy}");
    Ok(KilowattHours::from(energy))
}

/// Export cells are stored as text; nulls are dropped.
fn into_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

#[derive(Deserialize)]
struct Response {
    columns: Vec<Column>,
    data: Vec<Vec<Value>>,
    address: Option<WallboxAddress>,
    owner: Option<WallboxOwner>,
}

#[derive(Deserialize)]
struct Column {
    key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WallboxAddress {
    address1: Option<String>,
    postal_code: Option<String>,
    city: Option<String>,
}

impl From<WallboxAddress> for Address {
    fn from(address: WallboxAddress) -> Self {
        let default = Self::default();
        Self {
            line1: address.address1.unwrap_or(default.line1),
            postal_code: address.postal_code.unwrap_or(default.postal_code),
            city: address.city.unwrap_or(default.city),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WallboxOwner {
    first_name: Option<String>,
    last_name: Option<String>,
}

impl From<WallboxOwner> for Owner {
    fn from(owner: WallboxOwner) -> Self {
        let default = Self::default();
        Self {
            first_name: owner.first_name.unwrap_or(default.first_name),
            last_name: owner.last_name.unwrap_or(default.last_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    // language=JSON
    const RESPONSE: &str = r#"
        {
            "columns": [
                {"key": "start"},
                {"key": "end"},
                {"key": "energy"},
                {"key": "id_chip_name"},
                {"key": "charger"},
                {"key": "duration"},
                {"key": "comment"}
            ],
            "data": [
                ["01.01.2024 10:00:00", "01.01.2024 11:30:00", "10.5", "VolvoXC40", "Garage", 5400, null],
                ["02.01.2024 18:15:00", "02.01.2024 19:00:00", 4.25, null, "Garage", 2700, "guest"],
                ["03.01.2024 12:00:00", "03.01.2024 11:00:00", 1, "VolvoXC40", "Garage", -3600, null]
            ],
            "address": {"address1": "Main Street 1", "postalCode": "12345", "city": "Springfield"}
        }
    "#;

    #[test]
    fn test_parse_export_ok() -> Result {
        let export = SessionExport::try_from(serde_json::from_str::<Response>(RESPONSE)?)?;
        assert_eq!(export.sessions.len(), 2, "the reversed session must be skipped");

        assert_eq!(
            export.columns,
            ["start", "end", "energy", "id_chip_name", "charger", "duration", "comment"],
        );

        let first = &export.sessions[0];
        assert_eq!(first.start, Local.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
        assert_eq!(first.end, Local.with_ymd_and_hms(2024, 1, 1, 11, 30, 0).unwrap());
        assert_abs_diff_eq!(first.energy.0, 10.5);
        assert_eq!(first.identifier.as_deref(), Some("VolvoXC40"));
        assert_eq!(first.extra.get("charger").map(String::as_str), Some("Garage"));
        assert_eq!(first.extra.get("duration").map(String::as_str), Some("5400"));
        assert!(!first.extra.contains_key("comment"));

        let second = &export.sessions[1];
        assert_abs_diff_eq!(second.energy.0, 4.25);
        assert_eq!(second.identifier, None);
        assert_eq!(second.extra.get("comment").map(String::as_str), Some("guest"));

        assert_eq!(
            export.address,
            Some(Address {
                line1: "Main Street 1".to_owned(),
                postal_code: "12345".to_owned(),
                city: "Springfield".to_owned(),
            })
        );
        assert_eq!(export.owner, None);
        Ok(())
    }

    #[test]
    fn test_parse_export_malformed_timestamp() -> Result {
        // language=JSON
        let body = r#"{"columns": [{"key": "start"}, {"key": "end"}, {"key": "energy"}], "data": [["2024-01-01 10:00", "01.01.2024 11:00:00", 1.0]]}"#;
        assert!(SessionExport::try_from(serde_json::from_str::<Response>(body)?).is_err());
        Ok(())
    }

    #[test]
    fn test_parse_export_negative_energy() -> Result {
        // language=JSON
        let body = r#"{"columns": [{"key": "start"}, {"key": "end"}, {"key": "energy"}], "data": [["01.01.2024 10:00:00", "01.01.2024 11:00:00", -1.0]]}"#;
        assert!(SessionExport::try_from(serde_json::from_str::<Response>(body)?).is_err());
        Ok(())
    }

    #[test]
    fn test_parse_export_null_address_and_owner() -> Result {
        // language=JSON
        let body = r#"
            {
                "columns": [],
                "data": [],
                "address": {"address1": "Main Street 1", "postalCode": null},
                "owner": {"firstName": null, "lastName": "Lovelace"}
            }
        "#;
        let export = SessionExport::try_from(serde_json::from_str::<Response>(body)?)?;
        assert_eq!(export.address.unwrap().to_string(), "Main Street 1, 00000 Unknown");
        assert_eq!(export.owner.unwrap().to_string(), "Unknown Lovelace");
        Ok(())
    }

    #[test]
    #[ignore = "makes the API request"]
    fn test_get_sessions_ok() -> Result {
        let export_url = std::env::var("WALLBOX_EXPORT_URL")?;
        let export = Api::new(export_url).get_sessions()?;
        assert!(export.sessions.iter().all(|session| session.start <= session.end));
        Ok(())
    }
}
