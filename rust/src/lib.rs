mod actions;
mod core;
mod events;
mod logging;
mod state;
mod updates;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;

use flume::{Receiver, Sender};

pub use actions::AppAction;
pub use deso_api::{
    ApiError, FeedKind, NewPost, SignerError, TransactionSigner, UnsignedTransaction,
};
pub use events::{AppEvent, EventBus, EventSubscription, EventType};
pub use state::*;
pub use updates::*;

/// Shell-side sink for state updates. Implementations must be thread-safe;
/// updates arrive on a dedicated listener thread.
pub trait UpdateObserver: Send + Sync + 'static {
    fn apply(&self, update: AppUpdate);
}

/// Handle the platform shell keeps. Dispatch never blocks; state mutations
/// happen on the single core actor thread and come back as [`AppUpdate`]s
/// plus a shared snapshot readable at any time.
pub struct App {
    core_tx: Sender<CoreMsg>,
    update_rx: Receiver<AppUpdate>,
    listening: AtomicBool,
    shared_state: Arc<RwLock<AppState>>,
    events: Arc<EventBus>,
}

impl App {
    /// Boot the core. `data_dir` holds the config file; `signer` is the
    /// injected signing collaborator (the core never sees key material).
    pub fn new(data_dir: String, signer: Arc<dyn TransactionSigner>) -> Arc<Self> {
        logging::init_logging();
        tracing::info!(data_dir = %data_dir, "App::new() starting");

        let (update_tx, update_rx) = flume::unbounded();
        let (core_tx, core_rx) = flume::unbounded::<CoreMsg>();
        let shared_state = Arc::new(RwLock::new(AppState::empty()));
        let events = EventBus::new();

        // Actor loop thread (single threaded "app actor").
        let core_tx_for_core = core_tx.clone();
        let shared_for_core = shared_state.clone();
        let events_for_core = events.clone();
        thread::spawn(move || {
            let mut core = crate::core::AppCore::new(
                update_tx,
                core_tx_for_core,
                data_dir,
                signer,
                shared_for_core,
                events_for_core,
            );
            while let Ok(msg) = core_rx.recv() {
                core.handle_message(msg);
            }
        });

        Arc::new(Self {
            core_tx,
            update_rx,
            listening: AtomicBool::new(false),
            shared_state,
            events,
        })
    }

    /// Latest committed snapshot.
    pub fn state(&self) -> AppState {
        match self.shared_state.read() {
            Ok(g) => g.clone(),
            Err(poison) => poison.into_inner().clone(),
        }
    }

    pub fn dispatch(&self, action: AppAction) {
        // Contract: never block caller.
        let _ = self.core_tx.send(CoreMsg::Action(action));
    }

    /// Start forwarding updates to the observer. Only the first observer
    /// wins; a second listener would split the stream.
    pub fn listen_for_updates(&self, observer: Box<dyn UpdateObserver>) {
        if self
            .listening
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let rx = self.update_rx.clone();
        thread::spawn(move || {
            while let Ok(update) = rx.recv() {
                observer.apply(update);
            }
        });
    }

    /// The process-wide event bus. Screens subscribe here for cross-screen
    /// signals and publish the ones they originate.
    pub fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }
}
