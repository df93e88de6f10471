use clap::Parser;
use reqwest::Url;

use crate::{api::home_assistant, prelude::*};

#[derive(Parser)]
pub struct HomeAssistantArgs {
    /// Home Assistant API access token.
    #[clap(long = "home-assistant-access-token", env = "HOME_ASSISTANT_ACCESS_TOKEN")]
    pub access_token: Option<String>,

    /// Home Assistant API base URL. For example: `http://localhost:8123/api`.
    #[clap(long = "home-assistant-api-base-url", env = "HOME_ASSISTANT_API_BASE_URL")]
    pub base_url: Option<Url>,
}

impl HomeAssistantArgs {
    pub fn try_new_client(&self) -> Result<home_assistant::Api> {
        let access_token =
            self.access_token.as_deref().context("the Home Assistant access token is not set")?;
        let base_url =
            self.base_url.clone().context("the Home Assistant API base URL is not set")?;
        home_assistant::Api::try_new(access_token, base_url)
    }
}
