pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::command_handler::CommandHandler;
use crate::application::compose::{ComposeSettings, Providers, SignalComposer};
use crate::application::observed::ObservedValues;
use crate::application::signal_loop::{CycleReport, LoopSettings, SignalLoop};
use crate::config::{Credentials, WatchConfig, WatchedInstrument};
use crate::domain::error::DomainError;
use crate::domain::ports::chat_channel::ChatChannel;
use crate::domain::ports::filings_source::FilingsSource;
use crate::domain::ports::news_source::NewsSource;
use crate::infrastructure::ai::openai::OpenAiProvider;
use crate::infrastructure::chat::console::ConsoleChannel;
use crate::infrastructure::chat::discord::DiscordChannel;
use crate::infrastructure::chat::telegram::TelegramBot;
use crate::infrastructure::feeds::newsapi::NewsApiSource;
use crate::infrastructure::feeds::noop::{NoopFilings, NoopNews};
use crate::infrastructure::feeds::sec_edgar::SecEdgar;
use crate::infrastructure::feeds::MarketRouter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Pause after a failed `getUpdates` before polling again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Where loop output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Configured Telegram chat and/or Discord channel. At least one is required.
    Chat,
    /// Print to stdout.
    Stdout,
    /// No channels; for one-off commands whose reply the caller prints.
    None,
}

pub struct MarketSignal {
    config: WatchConfig,
    signal_loop: SignalLoop,
    commands: Arc<CommandHandler>,
    telegram: Option<Arc<TelegramBot>>,
    state: ObservedValues,
}

impl MarketSignal {
    pub fn new(
        config: WatchConfig,
        creds: &Credentials,
        delivery: Delivery,
    ) -> Result<Self, DomainError> {
        let timeout = config.provider_timeout();
        let ai = OpenAiProvider::new(
            creds.require_openai()?.to_string(),
            Some(config.ai.model.clone()),
        );

        let news: Arc<dyn NewsSource> = match (&creds.newsapi_key, config.providers.news) {
            (Some(key), true) => Arc::new(NewsApiSource::new(key.clone(), timeout)),
            (None, true) => {
                info!("NEWSAPI_KEY not set, news sections will be empty");
                Arc::new(NoopNews)
            }
            (_, false) => Arc::new(NoopNews),
        };
        let filings: Arc<dyn FilingsSource> = if config.providers.filings {
            Arc::new(SecEdgar::new(&config.providers.sec_user_agent, timeout))
        } else {
            Arc::new(NoopFilings)
        };

        let providers = Providers {
            market: Arc::new(MarketRouter::new(timeout)),
            news,
            filings,
            ai: Arc::new(ai),
        };

        let telegram = creds.telegram.as_ref().map(|t| {
            Arc::new(TelegramBot::new(t, &config.telegram.parse_mode, timeout))
        });

        let channels: Vec<Arc<dyn ChatChannel>> = match delivery {
            Delivery::Chat => {
                let mut channels: Vec<Arc<dyn ChatChannel>> = Vec::new();
                if let Some(bot) = &telegram {
                    channels.push(bot.clone());
                }
                if let Some(d) = &creds.discord {
                    channels.push(Arc::new(DiscordChannel::new(d, timeout)));
                }
                if channels.is_empty() {
                    return Err(DomainError::Config(
                        "no chat channel configured: set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID \
                         or DISCORD_BOT_TOKEN and DISCORD_CHANNEL_ID"
                            .into(),
                    ));
                }
                channels
            }
            Delivery::Stdout => vec![Arc::new(ConsoleChannel)],
            Delivery::None => Vec::new(),
        };

        let mut app = Self::with_providers(config, providers, channels)?;
        if delivery == Delivery::Chat {
            app.telegram = telegram;
        }
        Ok(app)
    }

    /// Assemble around caller-supplied providers and channels. Inbound
    /// Telegram commands are not served.
    pub fn with_providers(
        config: WatchConfig,
        providers: Providers,
        channels: Vec<Arc<dyn ChatChannel>>,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        let watchlist = config.watchlist()?;

        let composer = Arc::new(SignalComposer::new(
            providers,
            ComposeSettings {
                timeout: config.provider_timeout(),
                options: config.options,
                limits: config.limits,
                news: config.providers.news,
                filings: config.providers.filings,
            },
        ));
        let commands = Arc::new(CommandHandler::new(composer.clone(), &watchlist));
        let signal_loop = SignalLoop::new(
            composer,
            watchlist,
            channels,
            LoopSettings {
                interval: config.interval(),
                max_messages_per_cycle: config.limits.max_messages_per_cycle,
                first_observation: config.first_observation,
                send_header: config.send_header,
                delivery_timeout: config.provider_timeout(),
            },
        );

        Ok(Self {
            config,
            signal_loop,
            commands,
            telegram: None,
            state: ObservedValues::new(),
        })
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn watchlist(&self) -> &[WatchedInstrument] {
        self.signal_loop.watchlist()
    }

    pub fn observed(&self) -> &ObservedValues {
        &self.state
    }

    /// One sweep of the watch list against the values observed so far.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.signal_loop.run_cycle(&mut self.state).await
    }

    /// Reply text for a chat command such as `stock` with `["AAPL"]`.
    pub async fn handle_command(&self, command: &str, args: &[String]) -> String {
        self.commands.handle(command, args).await
    }

    /// Run the signal loop and, when Telegram is configured, the command
    /// listener until Ctrl-C.
    pub async fn serve(self) -> Result<(), DomainError> {
        info!(
            instruments = self.watchlist().len(),
            channels = ?self.signal_loop.channel_names(),
            interval_secs = self.config.interval_secs,
            "Starting market signal bot"
        );

        let listener = match (&self.telegram, self.config.telegram.commands) {
            (Some(bot), true) => Some(tokio::spawn(listen_for_commands(
                bot.clone(),
                self.commands.clone(),
                Duration::from_secs(self.config.telegram.poll_timeout_secs),
            ))),
            _ => None,
        };

        let Self {
            signal_loop, state, ..
        } = self;
        let result = tokio::select! {
            _ = signal_loop.run(state) => Ok(()),
            signal = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                signal.map_err(|e| DomainError::Config(format!("cannot listen for Ctrl-C: {e}")))
            }
        };

        if let Some(handle) = listener {
            handle.abort();
        }
        result
    }
}

/// Poll Telegram for commands and answer each one on its own task so a slow
/// reply never holds up the next poll.
async fn listen_for_commands(
    bot: Arc<TelegramBot>,
    handler: Arc<CommandHandler>,
    poll_timeout: Duration,
) {
    let mut offset = None;
    loop {
        match bot.poll_commands(offset, poll_timeout).await {
            Ok((commands, next)) => {
                offset = next;
                for inbound in commands {
                    let bot = bot.clone();
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let reply = handler
                            .handle(&inbound.command.name, &inbound.command.args)
                            .await;
                        if let Err(e) = bot.reply(&inbound, &reply).await {
                            warn!(chat_id = inbound.chat_id, error = %e, "Command reply failed");
                        }
                    });
                }
            }
            Err(e) => {
                warn!(error = %e, "Telegram polling failed");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
        }
    }
}
