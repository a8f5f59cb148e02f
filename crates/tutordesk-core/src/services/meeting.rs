//! Remote meeting creation over the Zoom server-to-server OAuth API.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::ZoomConfig;
use crate::utils::time;

const TOKEN_URL: &str = "https://zoom.us/oauth/token";
const MEETINGS_URL: &str = "https://api.zoom.us/v2/users/me/meetings";

/// Remote meeting creation capability.
pub trait MeetingService: Send + Sync {
    /// Whether credentials are present. Batch runs check this once before
    /// attempting any call.
    fn is_configured(&self) -> bool;

    /// Create a meeting starting at a local wall-clock time. Returns the
    /// join link on success, a human-readable message on failure.
    fn create_meeting(
        &self,
        topic: &str,
        local_time: &str,
        duration_minutes: u32,
    ) -> Result<String, String>;
}

/// Zoom implementation. The access token is fetched lazily with the
/// `account_credentials` grant and cached until a call comes back 401,
/// which forces one refresh and retry.
pub struct ZoomMeetingService {
    config: ZoomConfig,
    client: Client,
    token: Mutex<Option<String>>,
}

impl ZoomMeetingService {
    pub fn new(config: ZoomConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            config,
            client,
            token: Mutex::new(None),
        }
    }

    fn token(&self, force_refresh: bool) -> Result<String, String> {
        let mut cached = self
            .token
            .lock()
            .map_err(|_| "token cache poisoned".to_string())?;
        if !force_refresh {
            if let Some(token) = cached.as_ref() {
                return Ok(token.clone());
            }
        }
        let fresh = self.fetch_token()?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    fn fetch_token(&self) -> Result<String, String> {
        let response = self
            .client
            .post(TOKEN_URL)
            .query(&[
                ("grant_type", "account_credentials"),
                ("account_id", self.config.account_id.as_str()),
            ])
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .send()
            .map_err(|error| format!("Connection Error: {error}"))?;

        if !response.status().is_success() {
            let text = response.text().unwrap_or_default();
            tracing::warn!("zoom auth error: {text}");
            return Err("Authentication failed".to_string());
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }

        let token: TokenResponse = response
            .json()
            .map_err(|error| format!("Connection Error: {error}"))?;
        Ok(token.access_token)
    }

    fn post_meeting(&self, token: &str, payload: &serde_json::Value) -> Result<Response, String> {
        self.client
            .post(MEETINGS_URL)
            .bearer_auth(token)
            .json(payload)
            .send()
            .map_err(|error| format!("Request Error: {error}"))
    }

    fn parse_meeting(response: Response) -> Result<String, String> {
        let status = response.status();
        if status == StatusCode::CREATED {
            #[derive(Deserialize)]
            struct MeetingResponse {
                join_url: String,
            }

            let meeting: MeetingResponse = response
                .json()
                .map_err(|error| format!("Request Error: {error}"))?;
            return Ok(meeting.join_url);
        }
        let text = response.text().unwrap_or_default();
        Err(format!("API Error {}: {text}", status.as_u16()))
    }
}

impl MeetingService for ZoomMeetingService {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn create_meeting(
        &self,
        topic: &str,
        local_time: &str,
        duration_minutes: u32,
    ) -> Result<String, String> {
        let naive =
            time::parse_wall_clock(local_time).map_err(|error| format!("Date error: {error}"))?;
        let start_time = time::local_to_utc(naive)
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();

        let payload = serde_json::json!({
            "topic": topic,
            "type": 2,
            "start_time": start_time,
            "duration": duration_minutes,
            "timezone": "UTC",
            "agenda": "Tutoring Session",
        });

        let token = self.token(false)?;
        let mut response = self.post_meeting(&token, &payload)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            let token = self.token(true)?;
            response = self.post_meeting(&token, &payload)?;
        }
        let join_url = Self::parse_meeting(response)?;
        tracing::info!("created meeting {topic}");
        Ok(join_url)
    }
}
