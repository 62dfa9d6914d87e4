//! Hub de alertas
//!
//! Actor que es el único dueño del conjunto de suscriptores. `register`,
//! `unregister` y `publish` son mensajes en un buzón que consume una sola
//! tarea, así que el conjunto nunca se comparte ni necesita locks.
//!
//! Cada suscriptor tiene una cola de salida acotada. El hub solo escribe en
//! ella con `try_send`; si está llena el suscriptor se expulsa y su cola se
//! cierra, de modo que un consumidor lento nunca frena a los demás.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::AlertEvent;
use crate::utils::errors::HubError;

pub type SubscriberId = Uuid;

#[derive(Debug)]
enum HubCommand {
    Register {
        id: SubscriberId,
        outbound: mpsc::Sender<AlertEvent>,
    },
    Unregister(SubscriberId),
    Publish(AlertEvent),
    SubscriberCount(oneshot::Sender<usize>),
}

/// Handle del hub. Se clona y se pasa explícitamente a quien publique o
/// registre suscriptores.
#[derive(Debug, Clone)]
pub struct AlertHub {
    inbox: mpsc::UnboundedSender<HubCommand>,
    queue_capacity: usize,
}

/// Extremo de lectura de un suscriptor registrado
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<AlertEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Siguiente evento; `None` cuando el hub cerró la cola
    pub async fn recv(&mut self) -> Option<AlertEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<AlertEvent> {
        self.receiver.try_recv().ok()
    }
}

impl AlertHub {
    /// Arranca el actor en el runtime actual
    pub fn spawn(queue_capacity: usize) -> (Self, JoinHandle<()>) {
        let (inbox, commands) = mpsc::unbounded_channel();
        let actor = HubActor {
            commands,
            subscribers: HashMap::new(),
        };
        let handle = tokio::spawn(actor.run());

        let hub = Self {
            inbox,
            queue_capacity: queue_capacity.max(1),
        };
        (hub, handle)
    }

    pub fn subscribe(&self) -> Result<Subscription, HubError> {
        self.subscribe_with_capacity(self.queue_capacity)
    }

    pub fn subscribe_with_capacity(&self, capacity: usize) -> Result<Subscription, HubError> {
        let id = Uuid::new_v4();
        let (outbound, receiver) = mpsc::channel(capacity.max(1));
        self.send(HubCommand::Register { id, outbound })?;
        Ok(Subscription { id, receiver })
    }

    pub fn unregister(&self, id: SubscriberId) -> Result<(), HubError> {
        self.send(HubCommand::Unregister(id))
    }

    /// Encola el evento para difusión sin esperar a ningún suscriptor
    pub fn publish(&self, event: AlertEvent) -> Result<(), HubError> {
        self.send(HubCommand::Publish(event))
    }

    /// Número de suscriptores vivos, visto desde el actor después de
    /// procesar todo lo que ya estaba en el buzón
    pub async fn subscriber_count(&self) -> Result<usize, HubError> {
        let (reply, response) = oneshot::channel();
        self.send(HubCommand::SubscriberCount(reply))?;
        response.await.map_err(|_| HubError)
    }

    fn send(&self, command: HubCommand) -> Result<(), HubError> {
        self.inbox.send(command).map_err(|_| HubError)
    }
}

struct HubActor {
    commands: mpsc::UnboundedReceiver<HubCommand>,
    subscribers: HashMap<SubscriberId, mpsc::Sender<AlertEvent>>,
}

impl HubActor {
    async fn run(mut self) {
        info!("📡 Hub de alertas iniciado");

        while let Some(command) = self.commands.recv().await {
            match command {
                HubCommand::Register { id, outbound } => {
                    self.subscribers.insert(id, outbound);
                    info!("🔌 Suscriptor {} conectado ({} activos)", id, self.subscribers.len());
                }
                HubCommand::Unregister(id) => {
                    // Soltar el Sender cierra la cola: fin de stream para el suscriptor
                    if self.subscribers.remove(&id).is_some() {
                        info!("👋 Suscriptor {} desconectado ({} activos)", id, self.subscribers.len());
                    }
                }
                HubCommand::Publish(event) => self.broadcast(event),
                HubCommand::SubscriberCount(reply) => {
                    let _ = reply.send(self.subscribers.len());
                }
            }
        }

        info!("📡 Hub de alertas detenido");
    }

    fn broadcast(&mut self, event: AlertEvent) {
        debug!("📣 Difundiendo alerta {} a {} suscriptores", event.event_id, self.subscribers.len());

        self.subscribers.retain(|id, outbound| match outbound.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("🐢 Suscriptor {} no drena su cola, se expulsa", id);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Suscriptor {} ya cerrado, se elimina", id);
                false
            }
        });
    }
}
