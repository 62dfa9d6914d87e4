//! Canal WebSocket de alertas
//!
//! Cada conexión se registra en el hub y se atiende con dos tareas:
//! la de escritura drena la cola del suscriptor hacia el socket y la de
//! lectura solo detecta la desconexión del cliente para hacer `unregister`.

use std::fmt::Display;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tracing::{debug, error, warn};

use crate::services::{AlertHub, Subscription};
use crate::state::AppState;

pub fn create_alert_router() -> Router<AppState> {
    Router::new().route("/alerts", get(alerts_socket))
}

async fn alerts_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket: WebSocket| async move {
        match hub.subscribe() {
            Ok(subscription) => {
                let (sink, stream) = socket.split();
                serve_subscriber(sink, stream, hub, subscription).await;
            }
            Err(e) => error!("❌ No se pudo registrar el suscriptor: {}", e),
        }
    })
}

/// Atiende a un suscriptor hasta que se desconecta o el hub lo expulsa
pub async fn serve_subscriber<W, R, E>(mut sink: W, mut stream: R, hub: AlertHub, mut subscription: Subscription)
where
    W: Sink<Message> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: Display + Send + 'static,
{
    let id = subscription.id();

    let mut write_pump = tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    error!("❌ Error serializando alerta {}: {}", event.event_id, e);
                    continue;
                }
            };
            if sink.send(Message::Text(payload)).await.is_err() {
                return;
            }
        }
        // Cola cerrada por el hub: fin de stream
        let _ = sink.send(Message::Close(None)).await;
    });

    let mut read_pump = tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => debug!("💬 Mensaje de {}: {}", id, text),
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("⚠️ Error de WebSocket en {}: {}", id, e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut read_pump => {
            let _ = hub.unregister(id);
            let _ = write_pump.await;
        }
        _ = &mut write_pump => {
            // Expulsado por cola llena o socket roto
            read_pump.abort();
            let _ = hub.unregister(id);
        }
    }

    debug!("Conexión de {} cerrada", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertEvent, AlertLocation, GeofenceSummary, TransitionKind, VehicleSummary};
    use chrono::Utc;
    use futures::channel::mpsc;

    fn event() -> AlertEvent {
        AlertEvent {
            event_id: "evt_ws".to_string(),
            event_type: TransitionKind::Exit,
            timestamp: Utc::now(),
            vehicle: VehicleSummary::unknown("veh_1"),
            geofence: GeofenceSummary {
                geofence_id: "geo_1".to_string(),
                geofence_name: "Depot".to_string(),
                category: "delivery_zone".to_string(),
            },
            location: AlertLocation { latitude: 1.0, longitude: 2.0 },
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_json_and_unregisters_on_disconnect() {
        let (hub, _handle) = AlertHub::spawn(16);
        let subscription = hub.subscribe().unwrap();

        let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded::<Message>();
        let (incoming_tx, incoming_rx) = mpsc::unbounded::<Result<Message, axum::Error>>();

        let session = tokio::spawn(serve_subscriber(outgoing_tx, incoming_rx, hub.clone(), subscription));

        incoming_tx.unbounded_send(Ok(Message::Text("hola".to_string()))).unwrap();
        hub.publish(event()).unwrap();

        match outgoing_rx.next().await {
            Some(Message::Text(payload)) => {
                let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
                assert_eq!(json["event_id"], "evt_ws");
                assert_eq!(json["event_type"], "exit");
                assert_eq!(json["geofence"]["geofence_name"], "Depot");
            }
            other => panic!("expected text frame, got {:?}", other),
        }

        // El cliente se va: la tarea de lectura termina y se cierra el canal
        drop(incoming_tx);
        session.await.unwrap();

        assert!(matches!(outgoing_rx.next().await, Some(Message::Close(None))));
        assert_eq!(hub.subscriber_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_session_ends_when_hub_closes_queue() {
        let (hub, _handle) = AlertHub::spawn(16);
        let subscription = hub.subscribe().unwrap();
        let id = subscription.id();

        let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded::<Message>();
        let (_incoming_tx, incoming_rx) = mpsc::unbounded::<Result<Message, axum::Error>>();

        let session = tokio::spawn(serve_subscriber(outgoing_tx, incoming_rx, hub.clone(), subscription));

        // El cliente sigue conectado, pero el hub lo da de baja
        hub.unregister(id).unwrap();
        session.await.unwrap();

        assert!(matches!(outgoing_rx.next().await, Some(Message::Close(None))));
        assert_eq!(hub.subscriber_count().await.unwrap(), 0);
    }
}
