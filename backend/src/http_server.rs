// Handle http serving concerns

use std::convert::Infallible;

use log::warn;
use temperature_converter_model::{
    api::{ConvertRequest, Converted, ErrorBody, History, HistoryEntry, HistoryQuery, SessionOpened},
    RECENT_LIMIT,
};
use warp::{
    body::BodyDeserializeError,
    http::StatusCode,
    reject::InvalidQuery,
    reply::{self, Response},
    Filter, Rejection, Reply,
};

use crate::session::{SessionError, SessionId, Sessions};

// Conversion requests are a number and a unit name.
const MAX_BODY_SIZE: u64 = 1024;

// Declares routes to serve our HTTP interface.
pub fn routes(sessions: Sessions) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_sessions = warp::any().map(move || sessions.clone());

    let open_route = warp::post()
        .and(warp::path("sessions"))
        .and(warp::path::end())
        .and(with_sessions.clone())
        .and_then(open_session);

    let close_route = warp::delete()
        .and(warp::path!("sessions" / String))
        .and(with_sessions.clone())
        .and_then(close_session);

    let convert_route = warp::post()
        .and(warp::path!("sessions" / String / "conversions"))
        .and(warp::body::content_length_limit(MAX_BODY_SIZE))
        .and(warp::body::json())
        .and(with_sessions.clone())
        .and_then(convert);

    let history_route = warp::get()
        .and(warp::path!("sessions" / String / "history"))
        .and(warp::query::<HistoryQuery>())
        .and(with_sessions.clone())
        .and_then(history);

    let clear_route = warp::delete()
        .and(warp::path!("sessions" / String / "history"))
        .and(with_sessions)
        .and_then(clear_history);

    let routes = open_route
        .or(close_route)
        .or(convert_route)
        .or(history_route)
        .or(clear_route);

    warp::path("api")
        .and(warp::path("converter").and(routes))
        .recover(malformed_request)
}

async fn open_session(sessions: Sessions) -> Result<Response, Infallible> {
    Ok(match sessions.open().await {
        Ok(session_id) => reply::with_status(
            reply::json(&SessionOpened {
                session_id: session_id.to_string(),
            }),
            StatusCode::CREATED,
        )
        .into_response(),
        Err(e) => error_reply(e),
    })
}

async fn close_session(session_id: String, sessions: Sessions) -> Result<Response, Infallible> {
    Ok(match sessions.close(SessionId::from(session_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_reply(e),
    })
}

async fn convert(
    session_id: String,
    request: ConvertRequest,
    sessions: Sessions,
) -> Result<Response, Infallible> {
    let result = sessions
        .convert(SessionId::from(session_id), request.value, request.unit)
        .await;
    Ok(match result {
        Ok(record) => reply::json(&Converted {
            entry: HistoryEntry::from(&record),
        })
        .into_response(),
        Err(e) => error_reply(e),
    })
}

async fn history(
    session_id: String,
    query: HistoryQuery,
    sessions: Sessions,
) -> Result<Response, Infallible> {
    let limit = query.limit.unwrap_or(RECENT_LIMIT).min(RECENT_LIMIT);
    Ok(match sessions.recent(SessionId::from(session_id), limit).await {
        Ok(records) => reply::json(&History {
            entries: records.iter().map(HistoryEntry::from).collect(),
        })
        .into_response(),
        Err(e) => error_reply(e),
    })
}

async fn clear_history(session_id: String, sessions: Sessions) -> Result<Response, Infallible> {
    Ok(match sessions.clear(SessionId::from(session_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_reply(e),
    })
}

// Bodies and queries that cannot be decoded are answered like any other
// rejected request. Everything else is passed on, so that later filters such
// as static files still get a chance.
async fn malformed_request(rejection: Rejection) -> Result<Response, Rejection> {
    let error = if let Some(e) = rejection.find::<BodyDeserializeError>() {
        e.to_string()
    } else if let Some(e) = rejection.find::<InvalidQuery>() {
        e.to_string()
    } else {
        return Err(rejection);
    };
    warn!("Malformed request: {error}");
    Ok(
        reply::with_status(reply::json(&ErrorBody { error }), StatusCode::BAD_REQUEST)
            .into_response(),
    )
}

fn error_reply(error: SessionError) -> Response {
    let status = match error {
        SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        SessionError::Validation(_) => StatusCode::BAD_REQUEST,
        SessionError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    };
    warn!("Request failed with {status}: {error}");
    reply::with_status(
        reply::json(&ErrorBody {
            error: error.to_string(),
        }),
        status,
    )
    .into_response()
}
