//! Blocking client for the Panasonic Comfort Cloud API.
//!
//! - Requests go through a [`Transport`]; [`UreqTransport`] is the real one.
//! - Uses the models in `crate::models::comfort` and the control encoding in `crate::codec`.
//!
//! Session
//! - A token is obtained with [`ComfortClient::create_session`] or adopted with
//!   [`ComfortClient::validate_session`]. There is no local expiry: a token stays
//!   in use until the server rejects it, and renewing it is left to the caller.

use chrono::{Local, NaiveDate};
use http::{Method, Request, StatusCode};
use log::{debug, info};
use serde::de::DeserializeOwned;

use crate::codec::{ControlCommand, ControlParameters};
use crate::models::comfort::*;
use crate::transport::{Transport, TransportError, UreqTransport};

pub const BASE_URL: &str = "https://accsmart.panasonic.com";
pub const DEFAULT_OS_TIMEZONE: &str = "+01:00";
/// Exact body the control endpoint answers with when a command was accepted.
pub const SUCCESS_RESPONSE: &str = r#"{"result":0}"#;

const PATH_LOGIN: &str = "/auth/login";
const PATH_GROUPS: &str = "/device/group";
const PATH_DEVICE_STATUS: &str = "/deviceStatus/now/";
const PATH_HISTORY: &str = "/deviceHistoryData";
const PATH_CONTROL: &str = "/deviceStatus/control";
const PATH_VALIDATE: &str = "/auth/agreement/status/1";

const TOKEN_HEADER: &str = "X-User-Authorization";
const STATIC_HEADERS: &[(&str, &str)] = &[
    ("X-APP-TYPE", "1"),
    ("X-APP-VERSION", "1.20.0"),
    ("X-APP-TIMESTAMP", "1"),
    ("X-APP-NAME", "Comfort Cloud"),
    ("X-CFC-API-KEY", "Comfort Cloud"),
    ("User-Agent", "G-RAC"),
    ("Accept", "application/json; charset=utf-8"),
    ("Content-Type", "application/json"),
    ("Connection", "Keep-Alive"),
];

#[derive(Debug)]
pub enum ClientError {
    Transport(String),
    HttpStatus { status: u16, body: String },
    Authentication { reason: String, body: String },
    Control { status: u16, body: String },
    Parse { path: String, message: String, body: String },
    Encode(serde_json::Error),
    MissingDevice,
}

impl core::fmt::Display for ClientError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ClientError::Transport(s) => write!(f, "transport error: {}", s),
            ClientError::HttpStatus { status, body } => write!(f, "http {}: {}", status, body),
            ClientError::Authentication { reason, body } => {
                write!(f, "authentication failed: {}: {}", reason, body)
            }
            ClientError::Control { status, body } => write!(f, "control rejected (http {}): {}", status, body),
            ClientError::Parse { path, message, body } => {
                write!(f, "unexpected response at `{}`: {}: {}", path, message, body)
            }
            ClientError::Encode(e) => write!(f, "encoding request failed: {}", e),
            ClientError::MissingDevice => write!(f, "no device selected for a device-scoped call"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(value: serde_json::Error) -> Self {
        ClientError::Encode(value)
    }
}

impl From<TransportError> for ClientError {
    fn from(value: TransportError) -> Self {
        ClientError::Transport(value.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(String),
    /// The server rejected the held token. It is kept as-is until replaced.
    Invalid(String),
}

impl SessionState {
    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Unauthenticated => None,
            SessionState::Authenticated(t) | SessionState::Invalid(t) => Some(t),
        }
    }
}

struct Exchange {
    status: StatusCode,
    body: String,
}

pub struct ComfortClient<T: Transport = UreqTransport> {
    transport: T,
    base_url: String,
    os_timezone: String,
    session: SessionState,
    device_guid: Option<String>,
}

impl<T: Transport> ComfortClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_base_url(transport, BASE_URL)
    }

    pub fn with_base_url(transport: T, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!("Created client for {}", base_url);
        ComfortClient {
            transport,
            base_url,
            os_timezone: DEFAULT_OS_TIMEZONE.to_string(),
            session: SessionState::Unauthenticated,
            device_guid: None,
        }
    }

    /// Offset reported to the history endpoint, e.g. `+02:00`.
    pub fn with_os_timezone(mut self, offset: impl Into<String>) -> Self {
        self.os_timezone = offset.into();
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }

    pub fn set_device(&mut self, device_guid: impl Into<String>) {
        self.device_guid = Some(device_guid.into());
    }

    pub fn device_guid(&self) -> Option<&str> {
        self.device_guid.as_deref()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn require_device(&self) -> Result<&str, ClientError> {
        match self.device_guid.as_deref() {
            Some(guid) if !guid.is_empty() => Ok(guid),
            _ => Err(ClientError::MissingDevice),
        }
    }

    fn send(&self, method: Method, path: &str, body: Vec<u8>, token: Option<&str>) -> Result<Exchange, ClientError> {
        let url = self.url(path);
        let mut builder = Request::builder().method(method.clone()).uri(url.as_str());
        for (name, value) in STATIC_HEADERS {
            builder = builder.header(*name, *value);
        }
        if let Some(token) = token {
            builder = builder.header(TOKEN_HEADER, token);
        }
        let request = builder
            .body(body)
            .map_err(|e| ClientError::Transport(format!("invalid request for {}: {}", url, e)))?;

        debug!("{} {}", method, url);
        let response = self.transport.send(request)?;
        let status = response.status();
        let body = response.into_body();
        debug!("{} {} -> http {} ({} bytes)", method, path, status.as_u16(), body.len());
        if path != PATH_LOGIN {
            debug!("Response body: {}", body);
        }
        Ok(Exchange { status, body })
    }

    fn get(&self, path: &str) -> Result<Exchange, ClientError> {
        self.send(Method::GET, path, Vec::new(), self.session.token())
    }

    fn post(&self, path: &str, body: Vec<u8>) -> Result<Exchange, ClientError> {
        self.send(Method::POST, path, body, self.session.token())
    }

    fn success_body(exchange: Exchange) -> Result<String, ClientError> {
        if exchange.status.is_success() {
            Ok(exchange.body)
        } else {
            Err(ClientError::HttpStatus {
                status: exchange.status.as_u16(),
                body: exchange.body,
            })
        }
    }

    fn parse<D: DeserializeOwned>(body: String) -> Result<D, ClientError> {
        let result = {
            let mut de = serde_json::Deserializer::from_str(&body);
            serde_path_to_error::deserialize(&mut de)
        };
        result.map_err(|e| ClientError::Parse {
            path: e.path().to_string(),
            message: e.inner().to_string(),
            body,
        })
    }

    // =====================
    // Session
    // =====================

    /// Log in and hold the issued token, replacing any previous one.
    ///
    /// On failure the current session is left untouched.
    pub fn create_session(&mut self, username: &str, password: &str) -> Result<&str, ClientError> {
        let payload = serde_json::to_vec(&LoginRequest {
            language: 0,
            login_id: username,
            password,
        })?;
        let exchange = self.send(Method::POST, PATH_LOGIN, payload, None)?;
        if !exchange.status.is_success() {
            return Err(ClientError::Authentication {
                reason: format!("login rejected with http {}", exchange.status.as_u16()),
                body: exchange.body,
            });
        }

        let raw = exchange.body;
        let session: Session = match Self::parse(raw.clone()) {
            Ok(s) => s,
            Err(ClientError::Parse { path, message, body }) => {
                return Err(ClientError::Authentication {
                    reason: format!("malformed session response at `{}`: {}", path, message),
                    body,
                });
            }
            Err(other) => return Err(other),
        };
        if session.u_token.is_empty() {
            return Err(ClientError::Authentication {
                reason: "session response carried an empty token".to_string(),
                body: raw,
            });
        }

        info!("Created new session");
        self.session = SessionState::Authenticated(session.u_token);
        Ok(self.session.token().unwrap_or_default())
    }

    /// Probe the server with `token`.
    ///
    /// Accepted: the client holds `token` from now on. Rejected: the error carries
    /// the server body and the held token is unchanged (marked invalid when it is
    /// the one that was probed).
    pub fn validate_session(&mut self, token: &str) -> Result<(), ClientError> {
        let exchange = self.send(Method::GET, PATH_VALIDATE, Vec::new(), Some(token))?;
        if !exchange.status.is_success() {
            if self.session.token() == Some(token) {
                self.session = SessionState::Invalid(token.to_string());
            }
            return Err(ClientError::HttpStatus {
                status: exchange.status.as_u16(),
                body: exchange.body,
            });
        }
        debug!("Session token is valid");
        self.session = SessionState::Authenticated(token.to_string());
        Ok(())
    }

    // =====================
    // Directory
    // =====================

    pub fn list_groups(&self) -> Result<Groups, ClientError> {
        let body = Self::success_body(self.get(PATH_GROUPS)?)?;
        Self::parse(body)
    }

    /// GUIDs of every device in every group, in server order.
    ///
    /// A listed device without a GUID makes the whole listing a parse error.
    pub fn list_device_ids(&self) -> Result<Vec<String>, ClientError> {
        let body = Self::success_body(self.get(PATH_GROUPS)?)?;
        let groups: Groups = Self::parse(body.clone())?;

        let mut ids = Vec::new();
        for (i, group) in groups.groups.into_iter().enumerate() {
            for (j, device) in group.devices.into_iter().enumerate() {
                match device.device_guid {
                    Some(guid) if !guid.is_empty() => ids.push(guid),
                    _ => {
                        return Err(ClientError::Parse {
                            path: format!("groupList[{}].deviceList[{}].deviceGuid", i, j),
                            message: "missing device GUID".to_string(),
                            body,
                        });
                    }
                }
            }
        }
        Ok(ids)
    }

    // =====================
    // Device status and history
    // =====================

    pub fn device_status(&self) -> Result<Device, ClientError> {
        let guid = self.require_device()?;
        let path = format!("{}{}", PATH_DEVICE_STATUS, urlencoding::encode(guid));
        let body = Self::success_body(self.get(&path)?)?;
        let mut device: Device = Self::parse(body)?;
        if device.device_guid.is_none() {
            device.device_guid = Some(guid.to_string());
        }
        Ok(device)
    }

    /// History for the window containing today.
    pub fn device_history(&self, mode: HistoryDataMode) -> Result<History, ClientError> {
        self.device_history_on(mode, Local::now().date_naive())
    }

    pub fn device_history_on(&self, mode: HistoryDataMode, date: NaiveDate) -> Result<History, ClientError> {
        let guid = self.require_device()?;
        let payload = serde_json::to_vec(&HistoryRequest {
            data_mode: mode.code().to_string(),
            date: date.format("%Y%m%d").to_string(),
            device_guid: guid,
            os_timezone: &self.os_timezone,
        })?;
        let body = Self::success_body(self.post(PATH_HISTORY, payload)?)?;
        Self::parse(body)
    }

    // =====================
    // Control
    // =====================

    /// Send the fields set in `parameters` to the selected device.
    pub fn control(&self, parameters: ControlParameters) -> Result<(), ClientError> {
        let guid = self.require_device()?;
        let payload = ControlCommand::new(guid, parameters).to_json()?;
        debug!("Control command: {}", String::from_utf8_lossy(&payload));

        let exchange = self.post(PATH_CONTROL, payload)?;
        if !exchange.status.is_success() || exchange.body != SUCCESS_RESPONSE {
            return Err(ClientError::Control {
                status: exchange.status.as_u16(),
                body: exchange.body,
            });
        }
        Ok(())
    }

    /// Out-of-range values are sent as given; the unit decides.
    pub fn set_temperature(&self, celsius: f64) -> Result<(), ClientError> {
        self.control(ControlParameters::new().with_temperature(celsius))
    }

    pub fn set_fan_speed(&self, speed: FanSpeed) -> Result<(), ClientError> {
        self.control(ControlParameters::new().with_fan_speed(speed))
    }

    pub fn set_mode(&self, mode: OperationMode) -> Result<(), ClientError> {
        self.control(ControlParameters::new().with_mode(mode))
    }

    pub fn set_eco_mode(&self, mode: EcoMode) -> Result<(), ClientError> {
        self.control(ControlParameters::new().with_eco_mode(mode))
    }

    pub fn turn_on(&self) -> Result<(), ClientError> {
        self.control(ControlParameters::new().with_power(Power::On))
    }

    pub fn turn_off(&self) -> Result<(), ClientError> {
        self.control(ControlParameters::new().with_power(Power::Off))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::FakeTransport;
    use serde_json::json;

    const SESSION_BODY: &str = r#"{"uToken":"token12345","language":0,"result":0}"#;
    const GUID: &str = "CZ-CAPWFC1+B8B7F1B3E326";

    fn client(transport: FakeTransport) -> ComfortClient<FakeTransport> {
        ComfortClient::with_base_url(transport, "http://mock.local/")
    }

    fn device_client(transport: FakeTransport) -> ComfortClient<FakeTransport> {
        let mut c = client(transport);
        c.set_device(GUID);
        c
    }

    #[test]
    fn create_session_holds_issued_token() {
        let mut c = client(FakeTransport::new().respond(200, SESSION_BODY));
        let token = c.create_session("test@test.com", "secret1234").unwrap();
        assert_eq!(token, "token12345");
        assert_eq!(c.token(), Some("token12345"));
        assert_eq!(c.session(), &SessionState::Authenticated("token12345".into()));

        let req = c.transport().last_request();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/auth/login");
        assert_eq!(
            req.json(),
            json!({"language": 0, "loginId": "test@test.com", "password": "secret1234"})
        );
        assert_eq!(req.header(TOKEN_HEADER), None);
        assert_eq!(req.header("X-APP-VERSION"), Some("1.20.0"));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn create_session_replaces_token_wholesale() {
        let mut c = client(
            FakeTransport::new()
                .respond(200, SESSION_BODY)
                .respond(200, r#"{"uToken":"fresh","language":0,"result":0}"#),
        );
        c.create_session("u", "p").unwrap();
        c.create_session("u", "p").unwrap();
        assert_eq!(c.token(), Some("fresh"));
    }

    #[test]
    fn rejected_credentials_are_an_authentication_error() {
        let mut c = client(FakeTransport::new().respond(401, r#"{"code":4101,"message":"bad login"}"#));
        match c.create_session("u", "wrong") {
            Err(ClientError::Authentication { body, .. }) => assert!(body.contains("bad login")),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(c.session(), &SessionState::Unauthenticated);
    }

    #[test]
    fn malformed_session_response_is_an_authentication_error() {
        let mut c = client(FakeTransport::new().respond(200, SESSION_BODY).respond(200, r#"{"result":0}"#));
        c.create_session("u", "p").unwrap();
        match c.create_session("u", "p") {
            Err(ClientError::Authentication { reason, body }) => {
                assert!(reason.contains("uToken"), "{}", reason);
                assert_eq!(body, r#"{"result":0}"#);
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(c.token(), Some("token12345"));
    }

    #[test]
    fn empty_token_is_rejected() {
        let mut c = client(FakeTransport::new().respond(200, r#"{"uToken":"","result":0}"#));
        match c.create_session("u", "p") {
            Err(ClientError::Authentication { body, .. }) => assert_eq!(body, r#"{"uToken":"","result":0}"#),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(c.token(), None);
    }

    #[test]
    fn validate_session_adopts_accepted_token() {
        let mut c = client(FakeTransport::new().respond(200, r#"{"result":0}"#));
        c.validate_session("stored-token").unwrap();
        assert_eq!(c.session(), &SessionState::Authenticated("stored-token".into()));

        let req = c.transport().last_request();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path, "/auth/agreement/status/1");
        assert_eq!(req.header(TOKEN_HEADER), Some("stored-token"));
    }

    #[test]
    fn rejected_validation_keeps_held_token() {
        let mut c = client(
            FakeTransport::new()
                .respond(200, SESSION_BODY)
                .respond(401, r#"{"code":4100,"message":"Token expires"}"#)
                .respond(403, "denied"),
        );
        c.create_session("u", "p").unwrap();

        match c.validate_session("token12345") {
            Err(ClientError::HttpStatus { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Token expires"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(c.token(), Some("token12345"));
        assert_eq!(c.session(), &SessionState::Invalid("token12345".into()));

        assert!(c.validate_session("someone-else").is_err());
        assert_eq!(c.session(), &SessionState::Invalid("token12345".into()));
    }

    #[test]
    fn validation_transport_failure_leaves_session_alone() {
        let mut c = client(FakeTransport::new().respond(200, SESSION_BODY).fail("connection refused"));
        c.create_session("u", "p").unwrap();
        match c.validate_session("token12345") {
            Err(ClientError::Transport(msg)) => assert_eq!(msg, "connection refused"),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(c.session(), &SessionState::Authenticated("token12345".into()));
    }

    #[test]
    fn list_groups_parses_account_layout() {
        let mut c = client(
            FakeTransport::new()
                .respond(200, SESSION_BODY)
                .respond_fixture("groups.json"),
        );
        c.create_session("u", "p").unwrap();
        let groups = c.list_groups().unwrap();

        assert_eq!(groups.groups.len(), 1);
        assert_eq!(groups.groups[0].group_name, "My House");
        assert_eq!(groups.groups[0].devices.len(), 1);

        let req = c.transport().last_request();
        assert_eq!(req.path, "/device/group");
        assert_eq!(req.header(TOKEN_HEADER), Some("token12345"));
    }

    #[test]
    fn list_device_ids_flattens_groups() {
        let c = client(FakeTransport::new().respond_fixture("groups.json"));
        assert_eq!(c.list_device_ids().unwrap(), vec![GUID.to_string()]);
    }

    #[test]
    fn empty_account_lists_no_devices() {
        let c = client(FakeTransport::new().respond(200, r#"{"groupCount":0,"groupList":[]}"#));
        assert!(c.list_device_ids().unwrap().is_empty());
    }

    #[test]
    fn groups_without_group_list_is_parse_error() {
        let c = client(FakeTransport::new().respond(200, r#"{"code":4100,"message":"Token expires"}"#));
        match c.list_device_ids() {
            Err(ClientError::Parse { message, body, .. }) => {
                assert!(message.contains("groupList"), "{}", message);
                assert!(body.contains("Token expires"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn group_without_device_list_is_parse_error() {
        let c = client(FakeTransport::new().respond(200, r#"{"groupList":[{"groupName":"My House"}]}"#));
        match c.list_groups() {
            Err(ClientError::Parse { path, message, .. }) => {
                assert_eq!(path, "groupList[0]");
                assert!(message.contains("deviceList"), "{}", message);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn listed_device_without_guid_fails_listing() {
        let body = r#"{"groupList":[{"groupName":"My House","deviceList":[
            {"deviceGuid":"CZ-1","parameters":{"operate":1,"operationMode":0,"temperatureSet":20.0,"fanSpeed":0,"ecoMode":0}},
            {"deviceName":"attic","parameters":{"operate":0,"operationMode":3,"temperatureSet":21.0,"fanSpeed":1,"ecoMode":0}}
        ]}]}"#;
        let c = client(FakeTransport::new().respond(200, body));
        match c.list_device_ids() {
            Err(ClientError::Parse { path, body, .. }) => {
                assert_eq!(path, "groupList[0].deviceList[1].deviceGuid");
                assert!(body.contains("attic"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn expired_session_surfaces_status_and_body() {
        let c = client(FakeTransport::new().respond(401, r#"{"message":"Token expires"}"#));
        match c.list_groups() {
            Err(ClientError::HttpStatus { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Token expires"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn malformed_groups_report_json_path() {
        let c = client(FakeTransport::new().respond(200, r#"{"groupList":[{"groupName":7}]}"#));
        match c.list_groups() {
            Err(ClientError::Parse { path, body, .. }) => {
                assert_eq!(path, "groupList[0].groupName");
                assert!(body.contains("groupName"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn device_status_escapes_guid_and_parses_parameters() {
        let c = device_client(FakeTransport::new().respond_fixture("device-status.json"));
        let device = c.device_status().unwrap();

        assert_eq!(c.transport().last_request().path, "/deviceStatus/now/CZ-CAPWFC1%2BB8B7F1B3E326");
        assert_eq!(device.device_guid.as_deref(), Some(GUID));
        assert_eq!(device.parameters.operate, Power::On);
        assert_eq!(device.parameters.operation_mode, OperationMode::Auto);
        assert_eq!(device.parameters.temperature_set, 19.5);
        assert_eq!(device.parameters.fan_speed, FanSpeed::Auto);
        assert_eq!(device.capabilities.temperature_range(OperationMode::Heat), Some((16, 30)));
        assert!(!device.capabilities.supports(OperationMode::Fan));
    }

    #[test]
    fn status_without_guid_is_filled_from_request() {
        let body = r#"{"parameters":{"operate":0,"operationMode":3,"temperatureSet":21.0,"fanSpeed":2,"ecoMode":2}}"#;
        let c = device_client(FakeTransport::new().respond(200, body));
        let device = c.device_status().unwrap();
        assert_eq!(device.device_guid.as_deref(), Some(GUID));
        assert_eq!(device.parameters.eco_mode, EcoMode::Quiet);
    }

    #[test]
    fn status_with_unknown_mode_fails_whole_call() {
        let body = r#"{"parameters":{"operate":1,"operationMode":9,"temperatureSet":21.0,"fanSpeed":2,"ecoMode":0}}"#;
        let c = device_client(FakeTransport::new().respond(200, body));
        match c.device_status() {
            Err(ClientError::Parse { path, .. }) => assert_eq!(path, "parameters.operationMode"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn day_history_keeps_no_data_buckets() {
        let c = device_client(FakeTransport::new().respond_fixture("history-day.json"));
        let date = NaiveDate::from_ymd_opt(2020, 12, 16).unwrap();
        let history = c.device_history_on(HistoryDataMode::Day, date).unwrap();

        assert_eq!(history.entries.len(), 24);
        for entry in &history.entries[21..24] {
            assert_eq!(entry.consumption, NO_DATA);
            assert_eq!(entry.average_outside_temp, -255.0);
            assert!(!entry.has_data());
        }
        assert!(history.entries[..21].iter().all(HistoryEntry::has_data));

        let req = c.transport().last_request();
        assert_eq!(req.path, "/deviceHistoryData");
        assert_eq!(
            req.json(),
            json!({"dataMode": "0", "date": "20201216", "deviceGuid": GUID, "osTimezone": "+01:00"})
        );
    }

    #[test]
    fn history_without_entries_is_parse_error() {
        let c = device_client(FakeTransport::new().respond(200, r#"{"message":"busy"}"#));
        match c.device_history(HistoryDataMode::Day) {
            Err(ClientError::Parse { message, body, .. }) => {
                assert!(message.contains("historyDataList"), "{}", message);
                assert_eq!(body, r#"{"message":"busy"}"#);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn history_uses_configured_timezone() {
        let c = device_client(FakeTransport::new().respond(200, r#"{"historyDataList":[]}"#))
            .with_os_timezone("+02:00");
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let history = c.device_history_on(HistoryDataMode::Month, date).unwrap();
        assert!(history.entries.is_empty());

        let sent = c.transport().last_request().json();
        assert_eq!(sent["dataMode"], "2");
        assert_eq!(sent["osTimezone"], "+02:00");
    }

    #[test]
    fn turn_off_sends_explicit_zero() {
        let c = device_client(FakeTransport::new().respond(200, SUCCESS_RESPONSE));
        c.turn_off().unwrap();
        let req = c.transport().last_request();
        assert_eq!(req.path, "/deviceStatus/control");
        assert_eq!(req.json(), json!({"deviceGuid": GUID, "parameters": {"operate": 0}}));
    }

    #[test]
    fn each_setter_sends_only_its_field() {
        let c = device_client(
            FakeTransport::new()
                .respond(200, SUCCESS_RESPONSE)
                .respond(200, SUCCESS_RESPONSE)
                .respond(200, SUCCESS_RESPONSE)
                .respond(200, SUCCESS_RESPONSE)
                .respond(200, SUCCESS_RESPONSE),
        );
        c.turn_on().unwrap();
        c.set_temperature(19.5).unwrap();
        c.set_fan_speed(FanSpeed::Level3).unwrap();
        c.set_mode(OperationMode::Auto).unwrap();
        c.set_eco_mode(EcoMode::Powerful).unwrap();

        let sent = c
            .transport()
            .requests()
            .iter()
            .map(|r| r.json()["parameters"].clone())
            .collect::<Vec<_>>();
        assert_eq!(
            sent,
            vec![
                json!({"operate": 1}),
                json!({"temperatureSet": 19.5}),
                json!({"fanSpeed": 3}),
                json!({"operationMode": 0}),
                json!({"ecoMode": 1}),
            ]
        );
    }

    #[test]
    fn out_of_range_temperature_is_passed_through() {
        let c = device_client(FakeTransport::new().respond(200, SUCCESS_RESPONSE));
        c.set_temperature(45.0).unwrap();
        assert_eq!(c.transport().last_request().json()["parameters"], json!({"temperatureSet": 45.0}));
    }

    #[test]
    fn control_requires_exact_success_marker() {
        let c = device_client(
            FakeTransport::new()
                .respond(200, r#"{"result":1}"#)
                .respond(500, SUCCESS_RESPONSE)
                .respond(200, r#"{ "result": 0 }"#),
        );
        for expected_status in [200, 500, 200] {
            match c.turn_on() {
                Err(ClientError::Control { status, .. }) => assert_eq!(status, expected_status),
                other => panic!("unexpected: {:?}", other),
            }
        }
    }

    #[test]
    fn control_error_carries_raw_body() {
        let c = device_client(FakeTransport::new().respond(200, r#"{"code":5005,"message":"busy"}"#));
        let err = c.set_mode(OperationMode::Heat).unwrap_err();
        assert!(err.to_string().contains("busy"), "{}", err);
    }

    #[test]
    fn device_calls_without_guid_send_nothing() {
        let mut c = client(FakeTransport::new());
        assert!(matches!(c.turn_on(), Err(ClientError::MissingDevice)));
        assert!(matches!(c.device_status(), Err(ClientError::MissingDevice)));
        c.set_device("");
        assert!(matches!(
            c.device_history(HistoryDataMode::Week),
            Err(ClientError::MissingDevice)
        ));
        assert!(c.transport().requests().is_empty());
    }

    #[test]
    fn base_url_is_normalised() {
        let c = client(FakeTransport::new());
        assert_eq!(c.base_url(), "http://mock.local");
        assert_eq!(c.url("/device/group"), "http://mock.local/device/group");
    }
}
