// Google Sheets backend: a small blocking client for the Sheets v4 REST
// API. One `SheetsClient` addresses a single spreadsheet; worksheets are
// opened from it by title and keep their numeric sheet id for row
// deletion.

use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

use super::{a1_cell, a1_row, quote_sheet, StoreError, Workbook, Worksheet};

pub const DEFAULT_API_URL: &str = "https://sheets.googleapis.com/v4";

/// Client bound to one spreadsheet, authenticated with a bearer token.
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    token: String,
}

#[derive(Deserialize, Debug, Default)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Deserialize, Debug)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize, Debug)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AddSheetReply {
    properties: SheetProperties,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Reply {
    add_sheet: Option<AddSheetReply>,
}

#[derive(Deserialize, Debug, Default)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<Reply>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    message: String,
}

#[derive(Deserialize, Debug)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

impl SheetsClient {
    pub fn new(
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(SheetsClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            token: token.into(),
        })
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/spreadsheets/{}", self.base_url, self.spreadsheet_id)
    }

    fn values_url(&self, range: &str) -> String {
        format!("{}/values/{}", self.spreadsheet_url(), urlencoding::encode(range))
    }

    /// Send a request with auth attached, turning error statuses into
    /// `StoreError::Api` with Google's error message when one is present.
    fn send(&self, req: RequestBuilder) -> Result<Response, StoreError> {
        let res = req.bearer_auth(&self.token).send()?;
        if res.status().is_success() {
            return Ok(res);
        }
        let status = res.status().as_u16();
        let body = res.text().unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        warn!("sheets API returned {}: {}", status, message);
        Err(StoreError::Api { status, message })
    }

    fn sheet_properties(&self) -> Result<Vec<SheetProperties>, StoreError> {
        let req = self
            .client
            .get(self.spreadsheet_url())
            .query(&[("fields", "sheets.properties(sheetId,title)")]);
        let meta: SpreadsheetMeta = self.send(req)?.json()?;
        Ok(meta.sheets.into_iter().map(|s| s.properties).collect())
    }

    fn batch_update(&self, requests: serde_json::Value) -> Result<BatchUpdateResponse, StoreError> {
        let url = format!("{}:batchUpdate", self.spreadsheet_url());
        let req = self.client.post(url).json(&json!({ "requests": requests }));
        Ok(self.send(req)?.json()?)
    }
}

impl Workbook for SheetsClient {
    type Sheet = RemoteSheet;

    fn worksheet(&self, title: &str) -> Result<RemoteSheet, StoreError> {
        debug!("opening sheet '{}'", title);
        let props = self
            .sheet_properties()?
            .into_iter()
            .find(|p| p.title == title)
            .ok_or_else(|| StoreError::SheetNotFound(title.to_string()))?;
        Ok(RemoteSheet {
            client: self.clone(),
            title: props.title,
            sheet_id: props.sheet_id,
        })
    }

    fn add_worksheet(&self, title: &str, rows: usize, cols: usize) -> Result<RemoteSheet, StoreError> {
        debug!("adding sheet '{}' ({}x{})", title, rows, cols);
        let request = json!([{
            "addSheet": {
                "properties": {
                    "title": title,
                    "gridProperties": { "rowCount": rows, "columnCount": cols }
                }
            }
        }]);
        let response = match self.batch_update(request) {
            Err(StoreError::Api { status: 400, message }) if message.contains("already exists") => {
                return Err(StoreError::DuplicateSheet(title.to_string()));
            }
            other => other?,
        };
        let props = response
            .replies
            .into_iter()
            .find_map(|r| r.add_sheet)
            .map(|a| a.properties)
            .ok_or_else(|| StoreError::Api {
                status: 200,
                message: "addSheet reply missing sheet properties".into(),
            })?;
        Ok(RemoteSheet {
            client: self.clone(),
            title: props.title,
            sheet_id: props.sheet_id,
        })
    }
}

/// One worksheet of a remote spreadsheet.
#[derive(Clone)]
pub struct RemoteSheet {
    client: SheetsClient,
    title: String,
    sheet_id: i64,
}

impl RemoteSheet {
    pub fn sheet_id(&self) -> i64 {
        self.sheet_id
    }
}

impl Worksheet for RemoteSheet {
    fn title(&self) -> &str {
        &self.title
    }

    fn values(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let url = self.client.values_url(&quote_sheet(&self.title));
        let req = self.client.client.get(url);
        let range: ValueRange = self.client.send(req)?.json()?;
        debug!("fetched {} rows from '{}'", range.values.len(), self.title);
        Ok(range.values)
    }

    fn append_row(&self, row: &[String]) -> Result<(), StoreError> {
        let url = format!("{}:append", self.client.values_url(&quote_sheet(&self.title)));
        let req = self
            .client
            .client
            .post(url)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "values": [row] }));
        self.client.send(req)?;
        debug!("appended row to '{}'", self.title);
        Ok(())
    }

    fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        let range = a1_cell(&self.title, row, col);
        let req = self
            .client
            .client
            .put(self.client.values_url(&range))
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "values": [[value]] }));
        self.client.send(req)?;
        Ok(())
    }

    fn update_row(&self, row: usize, values: &[String]) -> Result<(), StoreError> {
        if row == 0 {
            return Err(StoreError::RowOutOfRange(row));
        }
        let range = a1_row(&self.title, row, values.len());
        let req = self
            .client
            .client
            .put(self.client.values_url(&range))
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "values": [values] }));
        self.client.send(req)?;
        debug!("updated row {} of '{}'", row, self.title);
        Ok(())
    }

    fn delete_row(&self, row: usize) -> Result<(), StoreError> {
        if row == 0 {
            return Err(StoreError::RowOutOfRange(row));
        }
        let request = json!([{
            "deleteDimension": {
                "range": {
                    "sheetId": self.sheet_id,
                    "dimension": "ROWS",
                    "startIndex": row - 1,
                    "endIndex": row
                }
            }
        }]);
        self.client.batch_update(request)?;
        debug!("deleted row {} of '{}'", row, self.title);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> SheetsClient {
        SheetsClient::new(server.url(), "abc", "tok").unwrap()
    }

    fn sheet(server: &mockito::ServerGuard, title: &str, sheet_id: i64) -> RemoteSheet {
        RemoteSheet {
            client: client(server),
            title: title.to_string(),
            sheet_id,
        }
    }

    #[test]
    fn values_are_fetched_with_bearer_token() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/spreadsheets/abc/values/%27alice%27")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(r#"{"range":"alice!A1:D3","values":[["Title","Author"],["Dune","Frank Herbert"]]}"#)
            .create();

        let values = sheet(&server, "alice", 7).values().unwrap();
        mock.assert();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1][0], "Dune");
    }

    #[test]
    fn empty_sheet_has_no_values() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/spreadsheets/abc/values/%27alice%27")
            .with_status(200)
            .with_body(r#"{"range":"alice!A1:Z1000","majorDimension":"ROWS"}"#)
            .create();

        let sheet = sheet(&server, "alice", 7);
        assert!(sheet.values().unwrap().is_empty());
        assert!(sheet.records().unwrap().is_empty());
    }

    #[test]
    fn append_posts_raw_row() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/spreadsheets/abc/values/%27alice%27:append")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("valueInputOption".into(), "RAW".into()),
                Matcher::UrlEncoded("insertDataOption".into(), "INSERT_ROWS".into()),
            ]))
            .match_body(Matcher::Json(json!({ "values": [["Dune", "Frank Herbert", "1965", "SciFi"]] })))
            .with_status(200)
            .with_body("{}")
            .create();

        let row: Vec<String> = ["Dune", "Frank Herbert", "1965", "SciFi"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        sheet(&server, "alice", 7).append_row(&row).unwrap();
        mock.assert();
    }

    #[test]
    fn update_cell_puts_single_a1_range() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PUT", "/spreadsheets/abc/values/%27alice%27%21B3")
            .match_header("authorization", "Bearer tok")
            .match_query(Matcher::UrlEncoded("valueInputOption".into(), "RAW".into()))
            .match_body(Matcher::Json(json!({ "range": "'alice'!B3", "values": [["Frank Herbert"]] })))
            .with_status(200)
            .with_body(r#"{"updatedCells":1}"#)
            .create();

        sheet(&server, "alice", 7).update_cell(3, 2, "Frank Herbert").unwrap();
        mock.assert();
    }

    #[test]
    fn update_row_writes_whole_row_at_once() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PUT", "/spreadsheets/abc/values/%27alice%27%21A3%3AD3")
            .match_query(Matcher::UrlEncoded("valueInputOption".into(), "RAW".into()))
            .match_body(Matcher::Json(json!({
                "range": "'alice'!A3:D3",
                "values": [["Dune", "Frank Herbert", "1965", "SciFi"]]
            })))
            .with_status(200)
            .with_body(r#"{"updatedCells":4}"#)
            .expect(1)
            .create();

        let row: Vec<String> = ["Dune", "Frank Herbert", "1965", "SciFi"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        sheet(&server, "alice", 7).update_row(3, &row).unwrap();
        mock.assert();
    }

    #[test]
    fn delete_row_uses_zero_based_dimension_range() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/spreadsheets/abc:batchUpdate")
            .match_body(Matcher::Json(json!({
                "requests": [{ "deleteDimension": { "range": {
                    "sheetId": 7, "dimension": "ROWS", "startIndex": 2, "endIndex": 3
                }}}]
            })))
            .with_status(200)
            .with_body(r#"{"spreadsheetId":"abc","replies":[{}]}"#)
            .create();

        sheet(&server, "alice", 7).delete_row(3).unwrap();
        mock.assert();
    }

    #[test]
    fn worksheet_resolves_sheet_id() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/spreadsheets/abc")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"sheets":[{"properties":{"sheetId":0,"title":"users"}},
                              {"properties":{"sheetId":42,"title":"alice"}}]}"#,
            )
            .create();

        let book = client(&server);
        assert_eq!(book.worksheet("alice").unwrap().sheet_id(), 42);
        assert!(matches!(book.worksheet("bob"), Err(StoreError::SheetNotFound(_))));
    }

    #[test]
    fn add_worksheet_returns_new_sheet() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/spreadsheets/abc:batchUpdate")
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::Json(json!({
                "requests": [{ "addSheet": { "properties": {
                    "title": "carol",
                    "gridProperties": { "rowCount": 100, "columnCount": 20 }
                }}}]
            })))
            .with_status(200)
            .with_body(
                r#"{"spreadsheetId":"abc","replies":[{"addSheet":{"properties":{"sheetId":99,"title":"carol","index":3}}}]}"#,
            )
            .create();

        let sheet = client(&server).add_worksheet("carol", 100, 20).unwrap();
        mock.assert();
        assert_eq!(sheet.sheet_id(), 99);
        assert_eq!(sheet.title(), "carol");
    }

    #[test]
    fn duplicate_add_sheet_is_reported() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/spreadsheets/abc:batchUpdate")
            .with_status(400)
            .with_body(
                r#"{"error":{"code":400,"message":"Invalid requests[0].addSheet: A sheet with the name \"alice\" already exists. Please enter another name.","status":"INVALID_ARGUMENT"}}"#,
            )
            .create();

        let err = client(&server).add_worksheet("alice", 100, 20).err().unwrap();
        assert!(matches!(err, StoreError::DuplicateSheet(name) if name == "alice"));
    }

    #[test]
    fn api_errors_carry_google_message() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/spreadsheets/abc/values/%27alice%27")
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"The caller does not have permission"}}"#)
            .create();

        let err = sheet(&server, "alice", 7).values().unwrap_err();
        match err {
            StoreError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "The caller does not have permission");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
