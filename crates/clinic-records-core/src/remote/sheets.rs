//! Google Sheets values API client.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::{RemoteError, RemoteResult, RemoteSheet};

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

/// Where the mirror lives and how to reach it.
#[derive(Debug, Clone)]
pub struct SheetsTarget {
    pub base_url: String,
    pub spreadsheet_id: String,
    /// Tab name; the first tab is conventionally "Sheet1"
    pub worksheet: String,
    /// OAuth bearer token
    pub token: String,
    pub timeout_secs: u64,
}

/// Blocking client for one worksheet.
pub struct SheetsClient {
    target: SheetsTarget,
    client: Client,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Serialize)]
struct ValuesBody<'a> {
    values: &'a [Vec<String>],
}

impl SheetsClient {
    /// Build a client without touching the network.
    pub fn new(target: SheetsTarget) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(target.timeout_secs))
            .build()
            .map_err(|e| RemoteError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            target: SheetsTarget {
                base_url: target.base_url.trim_end_matches('/').to_string(),
                ..target
            },
            client,
        })
    }

    /// Build a client and verify the sheet is reachable with these credentials.
    pub fn connect(target: SheetsTarget) -> RemoteResult<Self> {
        let client = Self::new(target)?;
        let header = client.read_header()?;
        tracing::info!(
            remote = %client.describe(),
            columns = header.len(),
            "connected to spreadsheet"
        );
        Ok(client)
    }

    /// A1 reference to the whole tab, optionally narrowed.
    fn range(&self, cells: Option<&str>) -> String {
        let tab = format!("'{}'", self.target.worksheet.replace('\'', "''"));
        match cells {
            Some(cells) => format!("{}!{}", tab, cells),
            None => tab,
        }
    }

    fn values_url(&self, range: &str, action: Option<&str>) -> RemoteResult<Url> {
        let mut url = Url::parse(&self.target.base_url)
            .map_err(|e| RemoteError::Unavailable(format!("Invalid base URL: {}", e)))?;
        let last = match action {
            Some(action) => format!("{}:{}", range, action),
            None => range.to_string(),
        };
        url.path_segments_mut()
            .map_err(|_| RemoteError::Unavailable("Base URL cannot hold a path".into()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.target.spreadsheet_id.as_str(),
                "values",
                last.as_str(),
            ]);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> RemoteResult<reqwest::blocking::Response> {
        let response = request
            .bearer_auth(&self.target.token)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Unavailable(format!(
                        "Request timed out after {}s",
                        self.target.timeout_secs
                    ))
                } else {
                    RemoteError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(RemoteError::Auth(body));
        }
        Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn get_values(&self, range: &str) -> RemoteResult<Vec<Vec<String>>> {
        let url = self.values_url(range, None)?;
        let response = self.send(self.client.get(url))?;
        let parsed: ValueRange = response
            .json()
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(parsed
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    fn put_values(&self, range: &str, rows: &[Vec<String>]) -> RemoteResult<()> {
        let url = self.values_url(range, None)?;
        self.send(
            self.client
                .put(url)
                .query(&[("valueInputOption", "RAW")])
                .json(&ValuesBody { values: rows }),
        )?;
        Ok(())
    }
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl RemoteSheet for SheetsClient {
    fn read_header(&self) -> RemoteResult<Vec<String>> {
        let rows = self.get_values(&self.range(Some("1:1")))?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    fn write_header(&self, header: &[String]) -> RemoteResult<()> {
        self.put_values(&self.range(Some("1:1")), &[header.to_vec()])
    }

    fn read_all(&self) -> RemoteResult<Vec<Vec<String>>> {
        self.get_values(&self.range(None))
    }

    fn append_rows(&self, rows: &[Vec<String>]) -> RemoteResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let url = self.values_url(&self.range(None), Some("append"))?;
        self.send(
            self.client
                .post(url)
                .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
                .json(&ValuesBody { values: rows }),
        )?;
        Ok(())
    }

    fn clear(&self) -> RemoteResult<()> {
        let url = self.values_url(&self.range(None), Some("clear"))?;
        self.send(self.client.post(url).json(&serde_json::json!({})))?;
        Ok(())
    }

    fn overwrite_all(&self, rows: &[Vec<String>]) -> RemoteResult<()> {
        self.put_values(&self.range(Some("A1")), rows)
    }

    fn describe(&self) -> String {
        format!(
            "spreadsheet {} tab '{}'",
            self.target.spreadsheet_id, self.target.worksheet
        )
    }
}
