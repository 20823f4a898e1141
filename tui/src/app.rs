use std::{collections::HashMap, io, str::FromStr, sync::mpsc};

use gasboard_common::{
    chain::ChainId,
    store::{GasStore, Mode, StoreChange},
};
use gasboard_ratatui_extra::{extensions::ThemedWidget, text_popup::TextPopup};
use gasboard_utils::{
    config::Config,
    feed::{FeeFeed, FeedEvent},
    network::Endpoints,
    price_manager::PriceManager,
    simulation::spawn_simulated_feed,
};
use ratatui::{
    buffer::Buffer,
    crossterm::event::KeyCode,
    layout::{Constraint, Layout, Rect},
    widgets::{Block, Widget},
    DefaultTerminal,
};
use tokio_util::sync::CancellationToken;

use crate::{
    events::{self, Event},
    pages::{dashboard::DashboardPage, footer::Footer, title::Title},
    theme::{Theme, ThemeName},
    traits::{Actions, Component},
};

/// Connection state of a chain's fee source, shown next to its fee widget.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FeedStatus {
    #[default]
    NotConfigured,
    Connecting,
    Live,
    Simulated,
    Error(String),
}

pub struct SharedState {
    pub store: GasStore,
    pub feed_status: HashMap<ChainId, FeedStatus>,
    /// Whether the price source is reachable. `None` until the first answer.
    pub online: Option<bool>,
    pub gas_limit: u64,
    pub theme: Theme,
}

impl SharedState {
    pub fn new(store: GasStore, theme: Theme, gas_limit: u64) -> Self {
        Self {
            store,
            feed_status: HashMap::new(),
            online: None,
            gas_limit,
            theme,
        }
    }

    pub fn feed_status(&self, chain: ChainId) -> FeedStatus {
        self.feed_status.get(&chain).cloned().unwrap_or_default()
    }

    /// In live mode a chain's fees only count once its feed has delivered a
    /// block. Until then the store may still hold simulated fees.
    pub fn fees_current(&self, chain: ChainId) -> bool {
        self.store.mode() == Mode::Simulation
            || !matches!(
                self.feed_status(chain),
                FeedStatus::NotConfigured | FeedStatus::Connecting
            )
    }
}

pub struct App {
    exit: bool,
    config: Config,
    endpoints: Endpoints,
    dashboard: DashboardPage,
    shared_state: SharedState,
    store_changes: mpsc::Receiver<StoreChange>,

    fatal_error_popup: TextPopup,

    input_thread: Option<std::thread::JoinHandle<()>>,
    tick_thread: Option<tokio::task::JoinHandle<()>>,
    feed_shutdown: Option<CancellationToken>,
    feed_threads: Vec<tokio::task::JoinHandle<()>>,
}

impl App {
    pub fn new(config: Config, initial_chain: Option<ChainId>) -> crate::Result<Self> {
        let endpoints = Endpoints::from_config(&config)?;
        let theme = Theme::new(ThemeName::from_str(&config.theme_name)?);

        let mut store = GasStore::default().with_mode(config.default_mode);
        store.set_transaction_value(config.transaction_value.max(0.0))?;
        let store_changes = store.subscribe();

        let selected_chain = initial_chain.unwrap_or(ChainId::Ethereum);
        if store.chain(selected_chain).is_none() {
            return Err(gasboard_common::Error::InvalidChainId(selected_chain.to_string()).into());
        }

        Ok(Self {
            exit: false,
            dashboard: DashboardPage::new(selected_chain),
            shared_state: SharedState::new(store, theme, config.gas_limit),
            store_changes,
            config,
            endpoints,

            fatal_error_popup: TextPopup::default().with_title("Error"),

            input_thread: None,
            tick_thread: None,
            feed_shutdown: None,
            feed_threads: Vec::new(),
        })
    }

    pub async fn run(&mut self) -> crate::Result<()> {
        let (event_tr, event_rc) = mpsc::channel::<Event>();
        let shutdown = CancellationToken::new();
        let mut terminal = ratatui::init();

        self.init_threads(&event_tr, &shutdown);
        self.start_feeds(&event_tr, &shutdown);

        let result = self
            .event_loop(&mut terminal, &event_tr, &event_rc, &shutdown)
            .await;

        // signal all the threads to exit
        shutdown.cancel();
        self.exit_threads().await;

        ratatui::restore();

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut DefaultTerminal,
        tr: &mpsc::Sender<Event>,
        rc: &mpsc::Receiver<Event>,
        shutdown: &CancellationToken,
    ) -> crate::Result<()> {
        while !self.exit {
            self.draw(terminal).map_err(crate::Error::Draw)?;
            self.handle_event(rc.recv()?, tr, shutdown).await;
        }

        // final render before exiting
        self.draw(terminal).map_err(crate::Error::Draw)?;
        Ok(())
    }

    fn draw(&self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        terminal.draw(|frame| {
            frame.render_widget(self, frame.area());
        })?;
        Ok(())
    }

    fn init_threads(&mut self, tr: &mpsc::Sender<Event>, sd: &CancellationToken) {
        let tr_input = tr.clone();
        let shutdown_signal = sd.clone();
        self.input_thread = Some(std::thread::spawn(move || {
            events::input::watch_input_events(tr_input, shutdown_signal);
        }));

        let tr_tick = tr.clone();
        let shutdown_signal = sd.clone();
        self.tick_thread = Some(tokio::spawn(async move {
            events::tick::start_ticking(tr_tick, shutdown_signal).await
        }));
    }

    /// Starts the fee and price sources for the store's current mode under a
    /// child of `sd`, so a mode switch can stop them without ending the app.
    fn start_feeds(&mut self, tr: &mpsc::Sender<Event>, sd: &CancellationToken) {
        let token = sd.child_token();
        let chains = self.shared_state.store.tracked_chains();
        let mode = self.shared_state.store.mode();
        tracing::info!(%mode, ?chains, "starting feeds");

        match mode {
            Mode::Live => {
                for chain in chains {
                    let url = match self.endpoints.ws_url(chain) {
                        Ok(url) => url.clone(),
                        Err(error) => {
                            tracing::warn!(%chain, %error, "no live feed");
                            self.shared_state
                                .feed_status
                                .insert(chain, FeedStatus::NotConfigured);
                            continue;
                        }
                    };
                    self.shared_state
                        .feed_status
                        .insert(chain, FeedStatus::Connecting);

                    let tr_feed = tr.clone();
                    self.feed_threads.push(
                        FeeFeed::new(chain, url, self.config.reconnect_delay())
                            .spawn(token.clone(), move |event| {
                                let _ = tr_feed.send(Event::from(event));
                            }),
                    );
                }

                let tr_eth_price = tr.clone();
                let price_manager = PriceManager::new(
                    self.endpoints.eth_http_url().cloned(),
                    self.config.price_cache_ttl(),
                    self.config.price_poll_interval(),
                );
                self.feed_threads
                    .push(price_manager.spawn_refresh_prices_thread(
                        token.clone(),
                        move |result| {
                            let _ = match result {
                                Ok(price) => tr_eth_price.send(Event::EthPrice(price)),
                                Err(error) => tr_eth_price.send(Event::EthPriceError {
                                    is_connect: error.is_connect(),
                                    message: error.to_string(),
                                }),
                            };
                        },
                    ));
            }
            Mode::Simulation => {
                for chain in &chains {
                    self.shared_state
                        .feed_status
                        .insert(*chain, FeedStatus::Simulated);
                }
                self.shared_state.online = None;

                let tr_sim = tr.clone();
                self.feed_threads.push(spawn_simulated_feed(
                    chains,
                    self.config.simulation_tick(),
                    None,
                    token.clone(),
                    move |event: FeedEvent| {
                        let _ = tr_sim.send(Event::from(event));
                    },
                ));
            }
        }

        self.feed_shutdown = Some(token);
    }

    async fn stop_feeds(&mut self) {
        if let Some(token) = self.feed_shutdown.take() {
            token.cancel();
        }
        for thread in self.feed_threads.drain(..) {
            if let Err(error) = thread.await {
                tracing::error!(%error, "feed task failed");
            }
        }
    }

    pub async fn exit_threads(&mut self) {
        self.stop_feeds().await;

        if let Some(thread) = self.tick_thread.take() {
            if let Err(error) = thread.await {
                tracing::error!(%error, "tick task failed");
            }
        }

        if let Some(thread) = self.input_thread.take() {
            if thread.join().is_err() {
                tracing::error!("input thread panicked");
            }
        }
    }

    async fn handle_event(
        &mut self,
        event: Event,
        tr: &mpsc::Sender<Event>,
        sd: &CancellationToken,
    ) {
        if let Err(error) = self.apply(&event) {
            tracing::error!(%error, "failed to apply event");
            self.fatal_error_popup.set_text(error.to_string());
        }

        if self.drain_store_changes() {
            self.stop_feeds().await;
            self.start_feeds(tr, sd);
        }
    }

    /// Applies one event to the UI and the store. Never blocks.
    fn apply(&mut self, event: &Event) -> crate::Result<()> {
        match event {
            Event::Input(key_event) => {
                if event.is_ctrl_c() {
                    self.exit = true;
                    return Ok(());
                }
                if self.fatal_error_popup.handle_event(key_event) {
                    return Ok(());
                }
                if event.is_char_pressed('q') || event.is_key_pressed(KeyCode::Esc) {
                    self.exit = true;
                    return Ok(());
                }

                let actions = self.dashboard.handle_event(event, &self.shared_state)?;
                self.process_actions(actions)?;
            }

            Event::Tick => {}

            Event::GasFee(chain, sample) => {
                self.shared_state.store.update_gas_fee(*chain, *sample)?;
                let status = match self.shared_state.store.mode() {
                    Mode::Live => FeedStatus::Live,
                    Mode::Simulation => FeedStatus::Simulated,
                };
                self.shared_state.feed_status.insert(*chain, status);
            }
            Event::FeedError(chain, message) => {
                tracing::warn!(%chain, %message, "fee feed error");
                self.shared_state
                    .feed_status
                    .insert(*chain, FeedStatus::Error(message.clone()));
            }

            Event::EthPrice(price) => {
                self.shared_state.store.update_eth_usd_price(*price)?;
                if self.shared_state.store.mode() == Mode::Live {
                    self.shared_state.online = Some(true);
                }
            }
            Event::EthPriceError {
                message,
                is_connect,
            } => {
                if *is_connect {
                    // ETH Price is the main API for understanding if we are connected to internet
                    self.shared_state.online = Some(false);
                } else {
                    self.fatal_error_popup.set_text(message.clone());
                }
            }
        }

        Ok(())
    }

    fn process_actions(&mut self, actions: Actions) -> crate::Result<()> {
        let store = &mut self.shared_state.store;

        if actions.toggle_mode {
            store.set_mode(store.mode().toggle());
        }

        if let Some(delta) = actions.transaction_value_delta {
            let value = (store.transaction_value() + delta).max(0.0);
            store.set_transaction_value(value)?;
        }

        Ok(())
    }

    /// Reacts to store changes. Returns true when the feeds need a restart.
    fn drain_store_changes(&mut self) -> bool {
        let mut restart_feeds = false;
        let mut reload = false;

        while let Ok(change) = self.store_changes.try_recv() {
            match change {
                StoreChange::Mode(mode) => {
                    tracing::info!(%mode, "mode changed");
                    if mode == Mode::Live {
                        self.forget_simulated_data();
                    }
                    restart_feeds = true;
                }
                StoreChange::GasFee(chain) => {
                    reload |= chain == self.dashboard.selected_chain();
                }
                StoreChange::EthUsdPrice(_) | StoreChange::TransactionValue(_) => {}
            }
        }

        if reload {
            self.dashboard.reload(&self.shared_state);
        }
        restart_feeds
    }

    /// Live mode starts without a price and without feed statuses. Both are
    /// refilled by the live sources.
    fn forget_simulated_data(&mut self) {
        if let Err(error) = self.shared_state.store.update_eth_usd_price(0.0) {
            tracing::error!(%error, "failed to reset the ETH/USD price");
        }
        self.shared_state.online = None;
        self.shared_state.feed_status.clear();
    }

    fn get_areas(&self, area: Rect) -> [Rect; 3] {
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area)
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let [title_area, body_area, footer_area] = self.get_areas(area);

        Title.render_component(title_area, buf, &self.shared_state);

        self.dashboard.render_component_with_block(
            body_area,
            buf,
            Block::bordered(),
            &self.shared_state,
        );

        Footer {
            exit: &self.exit,
            popup_open: &self.fatal_error_popup.is_open(),
        }
        .render(footer_area, buf, &self.shared_state.theme);

        self.fatal_error_popup
            .render(area, buf, &self.shared_state.theme);
    }
}
