// src/api.rs
use crate::auth::{bearer_token, create_token, verify_token};
use crate::config::Config;
use crate::dashboard::DashboardView;
use crate::error::{handle_rejection, AppError};
use crate::models::LoginRequest;
use crate::state::SharedState;
use crate::store::KeyValueStore;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

const BODY_LIMIT: u64 = 16 * 1024;

#[derive(Debug, Deserialize)]
pub struct QuantityChange {
    pub delta: i64,
}

/// All routes with errors rendered as JSON.
pub fn app<S>(
    state: SharedState<S>,
    config: Arc<Config>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone
where
    S: KeyValueStore + Send + 'static,
{
    routes(state, config).recover(handle_rejection)
}

pub fn routes<S>(
    state: SharedState<S>,
    config: Arc<Config>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone
where
    S: KeyValueStore + Send + 'static,
{
    let health = warp::path!("health").and(warp::get()).map(|| "OK");

    let login = warp::path!("login")
        .and(warp::post())
        .and(warp::body::content_length_limit(BODY_LIMIT))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and(with_config(config.clone()))
        .and_then(login_handler::<S>);

    let logout = warp::path!("logout")
        .and(warp::post())
        .and(with_auth(state.clone(), config.clone()))
        .and_then(logout_handler::<S>);

    let dashboard = warp::path!("dashboard")
        .and(warp::get())
        .and(with_auth(state.clone(), config.clone()))
        .and_then(dashboard_handler::<S>);

    let stocks = warp::path!("stocks")
        .and(warp::get())
        .and(with_auth(state.clone(), config.clone()))
        .and_then(stocks_handler::<S>);

    let quantity = warp::path!("stocks" / u32 / "quantity")
        .and(warp::post())
        .and(warp::body::content_length_limit(BODY_LIMIT))
        .and(warp::body::json())
        .and(with_auth(state.clone(), config.clone()))
        .and_then(quantity_handler::<S>);

    let buy = warp::path!("stocks" / u32 / "buy")
        .and(warp::post())
        .and(with_auth(state.clone(), config.clone()))
        .and_then(buy_handler::<S>);

    let portfolio = warp::path!("portfolio")
        .and(warp::get())
        .and(with_auth(state, config))
        .and_then(portfolio_handler::<S>);

    health
        .or(login)
        .or(logout)
        .or(dashboard)
        .or(stocks)
        .or(quantity)
        .or(buy)
        .or(portfolio)
}

fn with_state<S: Send + 'static>(
    state: SharedState<S>,
) -> impl Filter<Extract = (SharedState<S>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn with_config(
    config: Arc<Config>,
) -> impl Filter<Extract = (Arc<Config>,), Error = Infallible> + Clone {
    warp::any().map(move || config.clone())
}

/// Admits the request only with a valid token for the user currently logged in.
fn with_auth<S: KeyValueStore + Send + 'static>(
    state: SharedState<S>,
    config: Arc<Config>,
) -> impl Filter<Extract = (SharedState<S>,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(with_state(state))
        .and(with_config(config))
        .and_then(authorize::<S>)
}

async fn authorize<S: KeyValueStore + Send>(
    header: Option<String>,
    state: SharedState<S>,
    config: Arc<Config>,
) -> Result<SharedState<S>, Rejection> {
    let token = bearer_token(header.as_deref()).map_err(warp::reject::custom)?;
    let claims = verify_token(token, &config.jwt_secret).map_err(warp::reject::custom)?;

    let current = {
        let guard = state.lock().await;
        let session = guard.context.session();
        session.is_authenticated()
            && session.user().map(|u| u.email == claims.sub).unwrap_or(false)
    };
    if !current {
        return Err(warp::reject::custom(AppError::Unauthorized));
    }
    Ok(state)
}

async fn login_handler<S: KeyValueStore + Send>(
    request: LoginRequest,
    state: SharedState<S>,
    config: Arc<Config>,
) -> Result<impl Reply, Rejection> {
    let mut guard = state.lock().await;
    let user = match guard.context.login(request) {
        Ok(user) => user.clone(),
        Err(e) => {
            error!("Failed to log in: {}", e);
            return Err(warp::reject::custom(e));
        }
    };
    guard.reset_buy_screen();

    let token = create_token(&user.email, &config.jwt_secret, config.token_expiry_hours)
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&json!({ "token": token, "user": user })))
}

async fn logout_handler<S: KeyValueStore + Send>(
    state: SharedState<S>,
) -> Result<impl Reply, Rejection> {
    let mut guard = state.lock().await;
    match guard.context.logout() {
        Ok(()) => {
            guard.reset_buy_screen();
            Ok(warp::reply::with_status(
                warp::reply::json(&json!({ "message": "Logged out" })),
                StatusCode::OK,
            ))
        }
        Err(e) => {
            error!("Failed to log out: {}", e);
            Err(warp::reject::custom(e))
        }
    }
}

async fn dashboard_handler<S: KeyValueStore + Send>(
    state: SharedState<S>,
) -> Result<impl Reply, Rejection> {
    let guard = state.lock().await;
    let view = DashboardView::build(&guard.context).map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&view))
}

async fn stocks_handler<S: KeyValueStore + Send>(
    state: SharedState<S>,
) -> Result<impl Reply, Rejection> {
    let guard = state.lock().await;
    let credits = guard
        .context
        .session()
        .credits()
        .ok_or_else(|| warp::reject::custom(AppError::NotAuthenticated))?;
    Ok(warp::reply::json(&guard.buy_screen.view(credits)))
}

async fn quantity_handler<S: KeyValueStore + Send>(
    id: u32,
    change: QuantityChange,
    state: SharedState<S>,
) -> Result<impl Reply, Rejection> {
    let mut guard = state.lock().await;
    let quantity = guard
        .buy_screen
        .adjust_quantity(id, change.delta)
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&json!({ "id": id, "quantity": quantity })))
}

async fn buy_handler<S: KeyValueStore + Send>(
    id: u32,
    state: SharedState<S>,
) -> Result<impl Reply, Rejection> {
    let mut guard = state.lock().await;
    let inner = &mut *guard;
    match inner.buy_screen.buy(id, &mut inner.context) {
        Ok(message) => {
            info!("Buy of instrument {}: {:?}", id, message.kind);
            let credits = inner.context.session().credits();
            Ok(warp::reply::json(
                &json!({ "message": message, "credits": credits }),
            ))
        }
        Err(e) => {
            error!("Buy of instrument {} failed: {}", id, e);
            Err(warp::reject::custom(e))
        }
    }
}

async fn portfolio_handler<S: KeyValueStore + Send>(
    state: SharedState<S>,
) -> Result<impl Reply, Rejection> {
    let guard = state.lock().await;
    let ledger = guard.context.ledger();
    Ok(warp::reply::json(&json!({
        "records": ledger.records(),
        "summary": ledger.summarize(),
    })))
}
