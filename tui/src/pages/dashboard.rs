use chrono::Local;
use gasboard_common::{
    chain::ChainId,
    cost::gas_cost_usd,
    ohlc::Interval,
    store::{ChainState, GasStore},
};
use gasboard_ratatui_extra::{candle_chart::CandleChart, thematize::Thematize};
use ratatui::{
    buffer::Buffer,
    crossterm::event::{KeyCode, KeyEventKind},
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier},
    text::{Line, Span},
    widgets::{Block, Paragraph, Row, Table, Widget},
};
use strum::IntoEnumIterator;

use crate::{
    app::{FeedStatus, SharedState},
    traits::{Actions, Component},
    Event,
};

/// Step applied to the simulated transaction value by `+` and `-`, in ETH.
pub const TRANSACTION_VALUE_STEP: f64 = 0.1;

pub const LOADING_GAS: &str = "Loading gas data…";
pub const LOADING_PRICE: &str = "Loading ETH price…";

const FEE_WIDGET_HEIGHT: u16 = 6;
const SIMULATOR_HEIGHT: u16 = 7;

/// Main screen: one fee widget per chain, the transaction simulator and a
/// candlestick chart of the selected chain's total fee.
#[derive(Debug)]
pub struct DashboardPage {
    selected_chain: ChainId,
    interval: Interval,
    chart: CandleChart,
}

impl DashboardPage {
    pub fn new(selected_chain: ChainId) -> Self {
        Self {
            selected_chain,
            interval: Interval::default(),
            chart: CandleChart::default(),
        }
    }

    pub fn selected_chain(&self) -> ChainId {
        self.selected_chain
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn chart(&self) -> &CandleChart {
        &self.chart
    }

    fn select_next_chain(&mut self, store: &GasStore) {
        let mut next = self.selected_chain.next();
        for _ in 0..ChainId::all().len() {
            if store.chain(next).is_some() {
                break;
            }
            next = next.next();
        }
        self.selected_chain = next;
    }

    fn fee_lines(
        chain: ChainId,
        state: &ChainState,
        shared_state: &SharedState,
    ) -> Vec<Line<'static>> {
        let fee = state.current_fee();
        let units = chain.gas_units();
        let cost = match shared_state.store.eth_usd_price_available() {
            Some(price) => format!(
                "Est. cost: ${:.4}",
                gas_cost_usd(fee.total_fee(), shared_state.gas_limit, price)
            ),
            None => format!("Est. cost: {LOADING_PRICE}"),
        };

        vec![
            Line::from(format!("Base:     {:>12.4} {units}", fee.base_fee)),
            Line::from(format!("Priority: {:>12.4} {units}", fee.priority_fee)),
            Line::from(format!("Total:    {:>12.4} {units}", fee.total_fee())),
            Line::from(cost),
        ]
    }

    fn render_fee_widget(
        &self,
        chain: ChainId,
        area: Rect,
        buf: &mut Buffer,
        shared_state: &SharedState,
    ) {
        let theme = &shared_state.theme;
        let status = shared_state.feed_status(chain);

        let (r, g, b) = chain.color_rgb();
        let mut title_style = theme
            .style()
            .fg(Color::Rgb(r, g, b))
            .add_modifier(Modifier::BOLD);
        let mut border_style = theme.style();
        if chain == self.selected_chain {
            title_style = title_style.add_modifier(Modifier::UNDERLINED);
            border_style = theme.style_selected();
        }

        let block = Block::bordered()
            .border_type(theme.border_type())
            .border_style(border_style)
            .style(theme.style())
            .title(Line::styled(format!(" {} ", chain.label()), title_style))
            .title_top(
                Line::styled(format!(" {} ", status.label()), theme.style_dim()).right_aligned(),
            );
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = match shared_state.store.chain(chain) {
            Some(state) if !state.is_loading() && shared_state.fees_current(chain) => {
                Self::fee_lines(chain, state, shared_state)
            }
            _ => vec![
                Line::styled(LOADING_GAS, theme.style_dim()),
                Line::from(status.describe()),
            ],
        };
        Paragraph::new(lines).style(theme.style()).render(inner, buf);
    }

    fn render_simulator(&self, area: Rect, buf: &mut Buffer, shared_state: &SharedState) {
        let theme = &shared_state.theme;
        let store = &shared_state.store;

        let block = Block::bordered()
            .border_type(theme.border_type())
            .style(theme.style())
            .title(" Transaction Simulator ");
        let inner = block.inner(area);
        block.render(area, buf);

        let [table_area, summary_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        let row_style = |chain: ChainId| {
            if chain == self.selected_chain {
                theme.style_selected()
            } else {
                theme.style()
            }
        };
        let estimates = store.estimate_costs(shared_state.gas_limit);
        let rows: Vec<Row> = store
            .chains()
            .map(|(chain, state)| {
                let cells = if shared_state.fees_current(chain) {
                    let fee = state.current_fee();
                    let cost = estimates
                        .iter()
                        .flatten()
                        .find(|estimate| estimate.chain == chain)
                        .map_or_else(|| "-".to_string(), |e| format!("${:.4}", e.gas_usd));
                    [
                        format!("{:.4}", fee.base_fee),
                        format!("{:.4}", fee.priority_fee),
                        cost,
                    ]
                } else {
                    ["-".to_string(), "-".to_string(), "-".to_string()]
                };

                let [base_fee, priority_fee, cost] = cells;
                Row::new(vec![chain.label().to_string(), base_fee, priority_fee, cost])
                    .style(row_style(chain))
            })
            .collect();

        Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(17),
                Constraint::Length(21),
                Constraint::Min(10),
            ],
        )
        .header(
            Row::new(vec![
                "Chain",
                "Base Fee (Gwei)",
                "Priority Fee (Gwei)",
                "Estimated USD Cost",
            ])
            .style(theme.style().add_modifier(Modifier::BOLD)),
        )
        .style(theme.style())
        .render(table_area, buf);

        let value = store.transaction_value();
        let summary = match (store.eth_usd_price_available(), store.transaction_value_usd()) {
            (Some(price), Some(value_usd)) => format!(
                "ETH Price: ${price:.2} | Transaction Value: {value:.2} ETH = ${value_usd:.2}"
            ),
            _ => format!("{LOADING_PRICE} | Transaction Value: {value:.2} ETH"),
        };
        Line::from(summary)
            .style(theme.style())
            .render(summary_area, buf);
    }

    fn render_chart(&self, area: Rect, buf: &mut Buffer, shared_state: &SharedState) {
        let theme = &shared_state.theme;
        let chain = self.selected_chain;

        let intervals: Vec<Span> = Interval::iter()
            .flat_map(|interval| {
                let style = if interval == self.interval {
                    theme.style_selected()
                } else {
                    theme.style_dim()
                };
                [Span::styled(interval.to_string(), style), Span::raw(" ")]
            })
            .collect();

        let block = Block::bordered()
            .border_type(theme.border_type())
            .style(theme.style())
            .title(format!(
                " {} total fee ({}) ",
                chain.label(),
                chain.gas_units()
            ))
            .title_top(Line::from(intervals).right_aligned());
        let inner = block.inner(area);
        block.render(area, buf);

        self.chart.render(inner, buf);
    }
}

impl Component for DashboardPage {
    fn reload(&mut self, shared_state: &SharedState) {
        let candles = shared_state
            .store
            .candles(self.selected_chain, self.interval, &Local);
        self.chart.update(candles, self.interval);
    }

    fn handle_event(&mut self, event: &Event, shared_state: &SharedState) -> crate::Result<Actions> {
        let mut actions = Actions::default();

        let Some(key_event) = event.key_event() else {
            return Ok(actions);
        };
        if key_event.kind != KeyEventKind::Press {
            return Ok(actions);
        }

        match key_event.code {
            KeyCode::Tab => {
                self.select_next_chain(&shared_state.store);
                self.reload(shared_state);
            }
            KeyCode::Char('m') => actions.toggle_mode = true,
            KeyCode::Char('+') | KeyCode::Char('=') => {
                actions.transaction_value_delta = Some(TRANSACTION_VALUE_STEP)
            }
            KeyCode::Char('-') => actions.transaction_value_delta = Some(-TRANSACTION_VALUE_STEP),
            KeyCode::Char(key) => {
                if let Some(interval) = Interval::from_shortcut(key) {
                    self.interval = interval;
                    self.reload(shared_state);
                }
            }
            _ => {
                self.chart.handle_event(key_event);
            }
        }

        Ok(actions)
    }

    fn render_component(&self, area: Rect, buf: &mut Buffer, shared_state: &SharedState) -> Rect
    where
        Self: Sized,
    {
        let [fees_area, simulator_area, chart_area] = Layout::vertical([
            Constraint::Length(FEE_WIDGET_HEIGHT),
            Constraint::Length(SIMULATOR_HEIGHT),
            Constraint::Min(5),
        ])
        .areas(area);

        let chains = shared_state.store.tracked_chains();
        let widget_areas = Layout::horizontal(vec![
            Constraint::Ratio(1, chains.len().max(1) as u32);
            chains.len()
        ])
        .split(fees_area);
        for (chain, widget_area) in chains.iter().zip(widget_areas.iter()) {
            self.render_fee_widget(*chain, *widget_area, buf, shared_state);
        }

        self.render_simulator(simulator_area, buf, shared_state);
        self.render_chart(chart_area, buf, shared_state);

        area
    }
}

impl FeedStatus {
    /// Short tag shown in the fee widget border.
    pub fn label(&self) -> &'static str {
        match self {
            FeedStatus::NotConfigured => "off",
            FeedStatus::Connecting => "connecting",
            FeedStatus::Live => "live",
            FeedStatus::Simulated => "simulated",
            FeedStatus::Error(_) => "error",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FeedStatus::NotConfigured => "No WebSocket URL configured".to_string(),
            FeedStatus::Connecting => "Connecting...".to_string(),
            FeedStatus::Live => "Waiting for the next block".to_string(),
            FeedStatus::Simulated => "Waiting for the simulator".to_string(),
            FeedStatus::Error(message) => format!("Error: {message}"),
        }
    }
}
