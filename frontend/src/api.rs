// Talk to the converter service on behalf of the page

use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use temperature_converter_model::api::{
    ConvertRequest, Converted, ErrorBody, History, HistoryEntry, SessionOpened,
};

const SESSIONS_PATH: &str = "/api/converter/sessions";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Network(#[from] gloo_net::Error),

    #[error("{0}")]
    Rejected(String),
}

pub async fn open_session() -> Result<String, ApiError> {
    let response = Request::post(SESSIONS_PATH).send().await?;
    let opened: SessionOpened = read(response).await?;
    Ok(opened.session_id)
}

pub async fn convert(session_id: &str, request: &ConvertRequest) -> Result<HistoryEntry, ApiError> {
    let url = format!("{SESSIONS_PATH}/{session_id}/conversions");
    let response = Request::post(&url).json(request)?.send().await?;
    let converted: Converted = read(response).await?;
    Ok(converted.entry)
}

pub async fn history(session_id: &str) -> Result<Vec<HistoryEntry>, ApiError> {
    let url = format!("{SESSIONS_PATH}/{session_id}/history");
    let response = Request::get(&url).send().await?;
    let history: History = read(response).await?;
    Ok(history.entries)
}

pub async fn clear(session_id: &str) -> Result<(), ApiError> {
    let url = format!("{SESSIONS_PATH}/{session_id}/history");
    let response = Request::delete(&url).send().await?;
    if response.ok() {
        Ok(())
    } else {
        Err(rejection(&response).await)
    }
}

async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if response.ok() {
        Ok(response.json().await?)
    } else {
        Err(rejection(&response).await)
    }
}

async fn rejection(response: &Response) -> ApiError {
    match response.json::<ErrorBody>().await {
        Ok(body) => ApiError::Rejected(body.error),
        Err(_) => ApiError::Rejected(format!(
            "{} {}",
            response.status(),
            response.status_text()
        )),
    }
}
