use std::convert::Infallible;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, StatusCode};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tonic::{Request, Response, Status};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use farkle_env::config::Config;
use farkle_env::game::{has_any_scoring_option, score_selection};
use farkle_env::proto::farkle_table_server::{FarkleTable, FarkleTableServer};
use farkle_env::proto::{
    CreateGameRequest, CreateGameResponse, DiceRequest, GameEvent, GameSnapshot, GetStateRequest,
    HasAnyScoringOptionResponse, JoinGameRequest, JoinGameResponse, LeaveResponse,
    ScoreSelectionResponse, SeatRequest, SubscribeRequest, ToggleSelectRequest,
};
use farkle_env::service::{dice_values_from_proto, score_result_to_proto, Lobby, Metrics};

// ============================================================================
// gRPC 服務
// ============================================================================

struct FarkleService {
    lobby: Arc<Lobby>,
}

type EventStream = Pin<Box<dyn Stream<Item = Result<GameEvent, Status>> + Send>>;

#[tonic::async_trait]
impl FarkleTable for FarkleService {
    async fn create_game(
        &self,
        request: Request<CreateGameRequest>,
    ) -> Result<Response<CreateGameResponse>, Status> {
        let req = request.into_inner();
        let seated = self
            .lobby
            .create_game(&req.player_name, req.victory_score as i64)?;

        Ok(Response::new(CreateGameResponse {
            game_code: seated.game_code,
            player_index: seated.player_index as i32,
            seat_token: seated.seat_token,
        }))
    }

    async fn join_game(
        &self,
        request: Request<JoinGameRequest>,
    ) -> Result<Response<JoinGameResponse>, Status> {
        let req = request.into_inner();
        let seated = self.lobby.join_game(&req.game_code, &req.player_name)?;

        Ok(Response::new(JoinGameResponse {
            game_code: seated.game_code,
            player_index: seated.player_index as i32,
            seat_token: seated.seat_token,
        }))
    }

    async fn roll(&self, request: Request<SeatRequest>) -> Result<Response<GameSnapshot>, Status> {
        let req = request.into_inner();
        Ok(Response::new(self.lobby.roll(&req.game_code, &req.seat_token)?))
    }

    async fn toggle_select(
        &self,
        request: Request<ToggleSelectRequest>,
    ) -> Result<Response<GameSnapshot>, Status> {
        let req = request.into_inner();
        let snapshot = self
            .lobby
            .toggle_select(&req.game_code, &req.seat_token, req.index)?;
        Ok(Response::new(snapshot))
    }

    async fn set_aside(
        &self,
        request: Request<SeatRequest>,
    ) -> Result<Response<GameSnapshot>, Status> {
        let req = request.into_inner();
        Ok(Response::new(self.lobby.set_aside(&req.game_code, &req.seat_token)?))
    }

    async fn bank(&self, request: Request<SeatRequest>) -> Result<Response<GameSnapshot>, Status> {
        let req = request.into_inner();
        Ok(Response::new(self.lobby.bank(&req.game_code, &req.seat_token)?))
    }

    async fn leave(&self, request: Request<SeatRequest>) -> Result<Response<LeaveResponse>, Status> {
        let req = request.into_inner();
        let game_closed = self.lobby.leave(&req.game_code, &req.seat_token)?;
        Ok(Response::new(LeaveResponse { game_closed }))
    }

    async fn get_state(
        &self,
        request: Request<GetStateRequest>,
    ) -> Result<Response<GameSnapshot>, Status> {
        let req = request.into_inner();
        Ok(Response::new(self.lobby.get_state(&req.game_code)?))
    }

    type SubscribeStream = EventStream;

    async fn subscribe(
        &self,
        request: Request<SubscribeRequest>,
    ) -> Result<Response<Self::SubscribeStream>, Status> {
        let req = request.into_inner();
        let rx = self.lobby.subscribe(&req.game_code)?;
        let game_code = req.game_code;

        // 落後的訂閱者跳過遺失的事件，下一個 StateChanged 會帶完整快照
        let stream = BroadcastStream::new(rx).filter_map(move |item| match item {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                warn!(game = %game_code, %err, "subscriber lagged");
                None
            }
        });

        Ok(Response::new(Box::pin(stream) as Self::SubscribeStream))
    }

    async fn score_selection(
        &self,
        request: Request<DiceRequest>,
    ) -> Result<Response<ScoreSelectionResponse>, Status> {
        let values = dice_values_from_proto(&request.into_inner().values)?;
        Ok(Response::new(score_result_to_proto(&score_selection(&values))))
    }

    async fn has_any_scoring_option(
        &self,
        request: Request<DiceRequest>,
    ) -> Result<Response<HasAnyScoringOptionResponse>, Status> {
        let values = dice_values_from_proto(&request.into_inner().values)?;
        Ok(Response::new(HasAnyScoringOptionResponse {
            has_option: has_any_scoring_option(&values),
        }))
    }
}

// ============================================================================
// Prometheus 端點
// ============================================================================

fn metrics_response(path: &str, metrics: &Metrics) -> hyper::Response<Body> {
    if path != "/metrics" {
        let mut response = hyper::Response::new(Body::empty());
        *response.status_mut() = StatusCode::NOT_FOUND;
        return response;
    }

    match metrics.render() {
        Ok(text) => {
            let mut response = hyper::Response::new(Body::from(text));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(prometheus::TEXT_FORMAT));
            response
        }
        Err(err) => {
            error!(%err, "failed to encode metrics");
            let mut response = hyper::Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

async fn serve_metrics(addr: SocketAddr, metrics: Arc<Metrics>) -> Result<(), hyper::Error> {
    let make_svc = make_service_fn(move |_conn| {
        let metrics = Arc::clone(&metrics);
        async move {
            Ok::<_, Infallible>(service_fn(move |req: hyper::Request<Body>| {
                let metrics = Arc::clone(&metrics);
                async move { Ok::<_, Infallible>(metrics_response(req.uri().path(), &metrics)) }
            }))
        }
    });

    hyper::Server::try_bind(&addr)?.serve(make_svc).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load(None);
    let addr: SocketAddr = config.addr.parse()?;
    let metrics_addr: SocketAddr = config.metrics_addr.parse()?;
    let cleanup_interval = config.cleanup_interval.max(Duration::from_secs(1));

    let metrics = Arc::new(Metrics::new()?);
    let lobby = Arc::new(Lobby::new(config, Arc::clone(&metrics)));

    info!(%metrics_addr, "metrics endpoint listening");
    tokio::spawn(async move {
        if let Err(err) = serve_metrics(metrics_addr, metrics).await {
            error!(%err, "metrics endpoint stopped");
        }
    });

    // 定期清除已結束的牌桌
    let cleanup_lobby = Arc::clone(&lobby);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cleanup_interval);
        loop {
            ticker.tick().await;
            cleanup_lobby.cleanup_finished(Instant::now());
        }
    });

    info!(%addr, "FarkleTable gRPC server listening");

    tonic::transport::Server::builder()
        .add_service(FarkleTableServer::new(FarkleService { lobby }))
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}
