// src/api/handlers/ws.rs
use actix::{Actor, ActorContext, AsyncContext, Handler, Message, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use std::sync::Arc;

use crate::api::AppState;
use crate::models::RequestId;
use crate::polling::{PollHandle, PollRegistry};
use crate::view::StatusView;

#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct StatusUpdate(pub StatusView);

/// Result view of one request id over a WebSocket.
///
/// Connecting attaches to the poll registry; every state change is pushed
/// as a JSON `StatusView`. Disconnecting detaches, which tears the session
/// down once nobody else is watching.
pub struct ResultViewSocket {
    registry: Arc<PollRegistry>,
    request_id: RequestId,
    handle: Option<PollHandle>,
}

impl ResultViewSocket {
    pub fn new(registry: Arc<PollRegistry>, request_id: RequestId) -> Self {
        Self {
            registry,
            request_id,
            handle: None,
        }
    }
}

impl Actor for ResultViewSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let handle = self.registry.attach(self.request_id.clone());
        let mut rx = handle.subscribe();
        let addr = ctx.address();

        // owned by the context, so it is dropped with the socket even while
        // other viewers keep the session alive
        ctx.spawn(actix::fut::wrap_future::<_, Self>(async move {
            loop {
                let view = StatusView::from_snapshot(&rx.borrow_and_update());
                let finished = !view.polling;
                addr.do_send(StatusUpdate(view));
                if finished || rx.changed().await.is_err() {
                    break;
                }
            }
        }));

        log::info!("🔌 Result view opened for {}", self.request_id);
        self.handle = Some(handle);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        // dropping the handle detaches from the registry
        self.handle.take();
        log::info!("🔌 Result view closed for {}", self.request_id);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ResultViewSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                log::warn!("WebSocket error for {}: {}", self.request_id, e);
                ctx.stop();
            }
            _ => (),
        }
    }
}

impl Handler<StatusUpdate> for ResultViewSocket {
    type Result = ();

    fn handle(&mut self, msg: StatusUpdate, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg.0) {
            Ok(json) => ctx.text(json),
            Err(e) => log::error!("Could not encode status view: {}", e),
        }
    }
}

/// GET /ws/videos/{request_id}
pub async fn video_ws(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let socket = ResultViewSocket::new(state.polls.clone(), RequestId::new(path.into_inner()));
    ws::start(socket, &req, stream)
}
