//! Thin GET-JSON helper. Failures carry the stage they happened at so a
//! bad status is told apart from a body that does not match the schema.

use std::{fmt::Debug, time::Duration};

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("gasboard/", env!("CARGO_PKG_VERSION"));

pub type SerdePathError = serde_path_to_error::Error<serde_json::Error>;

#[derive(Debug)]
pub enum ReqwestStage {
    Send,
    Status,
    DecodeText,
    Deserialise,
}

#[derive(Debug)]
pub struct ReqwestErrorContext {
    pub url: Url,
    pub query: String,
}

#[derive(Debug)]
pub enum ReqwestInnerError {
    Reqwest(reqwest::Error),
    SerdePath(SerdePathError),
}

impl ReqwestInnerError {
    pub fn is_connect(&self) -> bool {
        match self {
            Self::Reqwest(err) => err.is_connect() || err.is_timeout(),
            Self::SerdePath(_) => false,
        }
    }
}

pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, SerdePathError> {
    serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_str(text))
}

pub struct Reqwest {
    builder: RequestBuilder,
    error_context: Option<ReqwestErrorContext>,
}

impl Reqwest {
    pub fn get<U: ToString>(url: U) -> crate::Result<Self> {
        let url = url
            .to_string()
            .parse::<Url>()
            .map_err(|_| crate::Error::InvalidUrl(url.to_string()))?;
        let builder = reqwest::Client::new()
            .get(url.clone())
            .timeout(REQUEST_TIMEOUT)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json");

        Ok(Self {
            builder,
            error_context: Some(ReqwestErrorContext {
                url,
                query: String::new(),
            }),
        })
    }

    pub fn query<T: serde::Serialize + Debug>(mut self, query: &T) -> Self {
        if let Some(context) = self.error_context.as_mut() {
            context.query = format!("{query:?}");
        }
        self.builder = self.builder.query(query);
        self
    }

    async fn receive_text(mut self) -> crate::Result<(String, Box<ReqwestErrorContext>)> {
        let context = Box::new(
            self.error_context
                .take()
                .ok_or(crate::Error::ReqwestErrorContextMissing)?,
        );

        let response = match self.builder.send().await {
            Ok(response) => response,
            Err(err) if err.is_connect() => return Err(crate::Error::Internet(context.url)),
            Err(err) => {
                return Err(crate::Error::ReqwestFailed {
                    stage: ReqwestStage::Send,
                    context,
                    inner: ReqwestInnerError::Reqwest(err),
                })
            }
        };

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(err) => {
                return Err(crate::Error::ReqwestFailed {
                    stage: ReqwestStage::Status,
                    context,
                    inner: ReqwestInnerError::Reqwest(err),
                })
            }
        };

        match response.text().await {
            Ok(text) => Ok((text, context)),
            Err(err) => Err(crate::Error::ReqwestFailed {
                stage: ReqwestStage::DecodeText,
                context,
                inner: ReqwestInnerError::Reqwest(err),
            }),
        }
    }

    pub async fn receive_json<J: Debug + DeserializeOwned>(self) -> crate::Result<J> {
        let (text, context) = self.receive_text().await?;

        parse_json(&text).map_err(|err| crate::Error::ReqwestFailed {
            stage: ReqwestStage::Deserialise,
            context,
            inner: ReqwestInnerError::SerdePath(err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Quote {
        #[allow(dead_code)]
        ethereum: Inner,
    }

    #[derive(Debug, serde::Deserialize)]
    struct Inner {
        #[allow(dead_code)]
        usd: f64,
    }

    #[test]
    fn json_errors_report_the_failing_path() {
        let err = parse_json::<Quote>(r#"{"ethereum":{"usd":"n/a"}}"#).unwrap_err();
        assert_eq!(err.path().to_string(), "ethereum.usd");
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(matches!(
            Reqwest::get("not a url"),
            Err(crate::Error::InvalidUrl(_))
        ));
    }
}
