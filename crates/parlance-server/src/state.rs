use std::sync::Arc;

use parlance::chat::ChatService;
use parlance::store::MessageStore;
use tokio::sync::broadcast;

use crate::routes::ws::ThreadEvent;

/// Capacity of the in-process event bus feeding WebSocket clients
const EVENT_BUS_CAPACITY: usize = 128;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub store: Arc<dyn MessageStore>,
    pub events: broadcast::Sender<ThreadEvent>,
    pub api_token: Option<String>,
}

impl AppState {
    pub fn new(
        chat: ChatService,
        store: Arc<dyn MessageStore>,
        api_token: Option<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self {
            chat: Arc::new(chat),
            store,
            events,
            api_token,
        }
    }
}
