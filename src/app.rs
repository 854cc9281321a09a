use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Modifier, Style};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::Theme;
use crate::api::SessionToken;
use crate::commands::Command;
use crate::config::{self, AppConfig, GlobalAction, KeyResolver};
use crate::controller::{Controller, ControllerMsg, Route, UpdateResult};
use crate::screen::{ArticlesScreen, LoginScreen, Screen};
use crate::tui::{Event, Tui};
use crate::ui::{
    Component, ErrorDialog, ErrorDialogEvent, EventResult, HelpEvent, HelpOverlay,
    KeybindingSection, StatusBar,
};

const FRAME_RATE: f64 = 30.0;
const TICK_RATE: f64 = 8.0;
const STATUS_BAR_HEIGHT: u16 = 6;

/// A login that was sent but has not produced a new session yet.
struct PendingLogin {
    username: String,
    previous: Option<SessionToken>,
}

pub struct App {
    controller: Controller,
    login: LoginScreen,
    articles: ArticlesScreen,
    status_bar: StatusBar,
    help: Option<HelpOverlay>,
    error: Option<ErrorDialog>,
    pending_login: Option<PendingLogin>,
    config_path: Option<PathBuf>,
    resolver: Arc<KeyResolver>,
    theme: Theme,
    error_tx: UnboundedSender<String>,
    error_rx: UnboundedReceiver<String>,
    should_quit: bool,
    should_suspend: bool,
}

impl App {
    pub fn new(
        controller: Controller,
        config: &AppConfig,
        config_path: Option<PathBuf>,
        resolver: Arc<KeyResolver>,
        theme: Theme,
    ) -> Self {
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            login: LoginScreen::new(config.last_username.as_deref(), resolver.clone()),
            articles: ArticlesScreen::new(config.articles.topics.clone(), resolver.clone()),
            status_bar: StatusBar::new(config.api.base_url.clone(), resolver.clone()),
            help: None,
            error: None,
            pending_login: None,
            config_path,
            resolver,
            theme,
            error_tx,
            error_rx,
            should_quit: false,
            should_suspend: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;

        loop {
            let Some(event) = tui.next_event().await else {
                break;
            };
            self.handle_event(&mut tui, event)?;
            self.update();

            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.resume()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        info!("Shutting down");
        Ok(())
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) -> Result<()> {
        match event {
            Event::Quit => self.should_quit = true,
            Event::Tick => {
                self.status_bar.handle_tick();
                self.active_screen().on_tick();
            }
            Event::Render => {
                tui.draw(|frame| self.draw(frame))?;
            }
            Event::Resize(width, height) => {
                tui.resize(width, height)?;
                tui.draw(|frame| self.draw(frame))?;
            }
            Event::Key(key) => self.handle_key(key)?,
            Event::Paste(text) => self.handle_paste(&text)?,
            Event::Error(e) => {
                warn!("Terminal event error: {e}");
                self.show_error(format!("Terminal error: {e}"));
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Char('z') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_suspend = true;
            return Ok(());
        }

        // Overlays capture all input while open.
        if let Some(dialog) = &mut self.error {
            if let EventResult::Event(ErrorDialogEvent::Dismissed) = dialog.handle_key(key)? {
                self.error = None;
            }
            return Ok(());
        }
        if let Some(help) = &mut self.help {
            if let EventResult::Event(HelpEvent::Close) = help.handle_key(key)? {
                self.help = None;
            }
            return Ok(());
        }

        // Screens are inert while a request is outstanding.
        if !self.controller.state().is_loading() {
            match self.active_screen().handle_key(key)? {
                EventResult::Event(msg) => {
                    self.dispatch(msg);
                    return Ok(());
                }
                EventResult::Consumed => return Ok(()),
                EventResult::Ignored => {}
            }
        }

        self.handle_global_key(key);
        Ok(())
    }

    /// Pasted text goes to the active screen as typed characters.
    fn handle_paste(&mut self, text: &str) -> Result<()> {
        if self.error.is_some() || self.help.is_some() || self.controller.state().is_loading() {
            return Ok(());
        }
        for c in text.chars().filter(|c| !c.is_control()) {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            if let EventResult::Event(msg) = self.active_screen().handle_key(key)? {
                self.dispatch(msg);
            }
        }
        Ok(())
    }

    fn handle_global_key(&mut self, key: KeyEvent) {
        let r = &self.resolver;
        if r.matches_global(&key, GlobalAction::Quit) {
            self.should_quit = true;
        } else if r.matches_global(&key, GlobalAction::Help) {
            self.open_help();
        } else if r.matches_global(&key, GlobalAction::LoginScreen) {
            self.dispatch(ControllerMsg::Navigate(Route::Login));
        } else if r.matches_global(&key, GlobalAction::ArticlesScreen) {
            self.dispatch(ControllerMsg::Navigate(Route::Articles));
        } else if r.matches_global(&key, GlobalAction::Logout)
            && self.controller.state().is_authenticated()
        {
            self.dispatch(ControllerMsg::Logout);
        }
    }

    fn dispatch(&mut self, msg: ControllerMsg) {
        if let ControllerMsg::Login(credentials) = &msg {
            self.pending_login = Some(PendingLogin {
                username: credentials.username.clone(),
                previous: self.controller.state().session().cloned(),
            });
        }
        self.controller.queue(msg);
    }

    /// Fold queued messages, spawn the resulting commands and surface
    /// failures that are not request outcomes.
    fn update(&mut self) {
        match self.controller.update() {
            Ok(UpdateResult::Idle) => {}
            Ok(UpdateResult::Commands(commands)) => {
                for command in commands {
                    self.spawn(command);
                }
            }
            Err(e) => {
                error!("Controller update failed: {e}");
                self.show_error(format!("Could not update the session: {e}"));
            }
        }

        self.remember_username();

        while let Ok(message) = self.error_rx.try_recv() {
            self.show_error(message);
        }
    }

    fn spawn(&self, command: Box<dyn Command>) {
        let name = command.name();
        let error_tx = self.error_tx.clone();
        debug!("Spawning command: {name}");
        tokio::spawn(async move {
            if let Err(e) = command.execute().await {
                error!("Command {name} failed: {e}");
                let _ = error_tx.send(format!("{name} failed: {e}"));
            }
        });
    }

    /// Persist the username once its login produced a new session.
    fn remember_username(&mut self) {
        let state = self.controller.state();
        let signed_in = self
            .pending_login
            .as_ref()
            .is_some_and(|p| state.session().is_some() && state.session() != p.previous.as_ref());
        if !signed_in {
            return;
        }

        if let Some(pending) = self.pending_login.take()
            && let Err(e) = config::save_last_username(self.config_path.as_deref(), &pending.username)
        {
            warn!("Failed to save last username: {e}");
            self.show_error(format!("Failed to save config: {e}"));
        }
    }

    fn open_help(&mut self) {
        let route = self.controller.state().route();
        let sections = vec![
            KeybindingSection::new(route.title(), self.active_screen().keybindings()),
            KeybindingSection::new("Global", self.status_bar.global_keybindings()),
        ];
        self.help = Some(HelpOverlay::new(sections, self.resolver.clone()));
    }

    fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(ErrorDialog::new(message, self.resolver.clone()));
    }

    fn active_screen(&mut self) -> &mut dyn Screen {
        match self.controller.state().route() {
            Route::Login => &mut self.login,
            Route::Articles => &mut self.articles,
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [screen_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
                .areas(area);

        let state = self.controller.state();
        self.login.sync(state);
        self.articles.sync(state);

        let screen: &mut dyn Screen = match state.route() {
            Route::Login => &mut self.login,
            Route::Articles => &mut self.articles,
        };
        screen.render(frame, screen_area, &self.theme);
        if state.is_loading() {
            frame
                .buffer_mut()
                .set_style(screen_area, Style::default().add_modifier(Modifier::DIM));
        }

        let keybindings = screen.keybindings();
        self.status_bar
            .render(frame, status_area, &self.theme, state, &keybindings);

        if let Some(help) = &mut self.help {
            help.render(frame, area, &self.theme);
        }
        if let Some(dialog) = &mut self.error {
            dialog.render(frame, area, &self.theme);
        }
    }
}
