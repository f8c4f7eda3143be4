//! Main chat event loop and UI rendering.
//!
//! Runs the full-screen terminal session: polls input, renders the
//! transcript and input box, and drains stream events between polls.

use ratatui::crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::{error::Error, io, time::Duration};
use tokio_util::sync::CancellationToken;

use crate::commands::{process_input, CommandResult};
use crate::core::chat_stream::{ChatStreamService, StreamMessage, StreamParams};
use crate::core::config::Config;
use crate::core::conversation::Conversation;
use crate::core::message::TranscriptRole;
use crate::logging::TranscriptLog;

const INPUT_AREA_HEIGHT: u16 = 3;
const TITLE_HEIGHT: u16 = 1;

pub struct ChatApp {
    pub conversation: Conversation,
    pub input: String,
    pub logging: TranscriptLog,
    client: reqwest::Client,
    config: Config,
    api_key: String,
    scroll_offset: u16,
    auto_scroll: bool,
    streaming: bool,
    current_stream_id: u64,
    cancel_token: Option<CancellationToken>,
}

impl ChatApp {
    pub fn new(
        config: Config,
        system_prompt: String,
        api_key: String,
        log_file: Option<String>,
    ) -> Self {
        Self {
            conversation: Conversation::new(system_prompt),
            input: String::new(),
            logging: TranscriptLog::new(log_file),
            client: reqwest::Client::new(),
            config,
            api_key,
            scroll_offset: 0,
            auto_scroll: true,
            streaming: false,
            current_stream_id: 0,
            cancel_token: None,
        }
    }

    fn submit_input(&mut self, stream: &ChatStreamService) {
        let input_text = std::mem::take(&mut self.input);
        if input_text.trim().is_empty() {
            return;
        }

        match process_input(&mut self.logging, &input_text) {
            CommandResult::Handled(feedback) => self.conversation.add_app_info(feedback),
            CommandResult::Submit(text) => self.send_message(&text, stream),
        }
        self.auto_scroll = true;
    }

    fn send_message(&mut self, text: &str, stream: &ChatStreamService) {
        // A new turn supersedes any stream still in flight.
        self.cancel_in_flight();

        let api_messages = self.conversation.add_user_message(text);
        if let Err(e) = self.logging.log_message(&format!("You: {text}")) {
            self.conversation
                .add_app_error(format!("Failed to write log: {e}"));
        }

        self.current_stream_id += 1;
        let cancel_token = CancellationToken::new();
        self.cancel_token = Some(cancel_token.clone());
        self.streaming = true;

        stream.spawn_stream(StreamParams {
            client: self.client.clone(),
            base_url: self.config.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            api_messages,
            cancel_token,
            stream_id: self.current_stream_id,
        });
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if self.streaming {
            self.conversation.abort_response();
            self.streaming = false;
        }
    }

    pub fn handle_stream_event(&mut self, message: StreamMessage, stream_id: u64) {
        if stream_id != self.current_stream_id {
            return;
        }

        match message {
            StreamMessage::Chunk(content) => {
                if self.streaming {
                    self.conversation.append_to_response(&content);
                }
            }
            StreamMessage::Error(error) => {
                if self.streaming {
                    self.conversation.abort_response();
                    self.conversation.add_app_error(error.to_string());
                    let _ = self.logging.log_message(&error.to_string());
                    self.streaming = false;
                }
            }
            StreamMessage::End => {
                if self.streaming {
                    if self.conversation.finalize_response() {
                        let reply = self
                            .conversation
                            .messages()
                            .last()
                            .map(|m| m.content.clone())
                            .unwrap_or_default();
                        if let Err(e) = self.logging.log_message(&reply) {
                            self.conversation
                                .add_app_error(format!("Failed to write log: {e}"));
                        }
                    } else {
                        self.conversation
                            .add_app_error("Received empty response from API");
                    }
                    self.streaming = false;
                }
            }
        }
    }

    fn build_display_lines(&self) -> Vec<Line<'_>> {
        let mut lines = Vec::new();

        for msg in self.conversation.messages() {
            match msg.role {
                TranscriptRole::User => {
                    lines.push(Line::from(vec![
                        Span::styled(
                            "You: ",
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(msg.content.as_str(), Style::default().fg(Color::Cyan)),
                    ]));
                    lines.push(Line::from(""));
                }
                TranscriptRole::Assistant => {
                    push_content_lines(&mut lines, &msg.content, Style::default().fg(Color::White));
                    lines.push(Line::from(""));
                }
                TranscriptRole::AppInfo => {
                    lines.push(Line::from(Span::styled(
                        msg.content.as_str(),
                        Style::default().fg(Color::DarkGray),
                    )));
                    lines.push(Line::from(""));
                }
                TranscriptRole::AppError => {
                    lines.push(Line::from(Span::styled(
                        msg.content.as_str(),
                        Style::default().fg(Color::Red),
                    )));
                    lines.push(Line::from(""));
                }
            }
        }

        // The in-flight reply renders like a committed assistant message.
        if self.streaming && !self.conversation.current_response().is_empty() {
            push_content_lines(
                &mut lines,
                self.conversation.current_response(),
                Style::default().fg(Color::White),
            );
        }

        lines
    }

    fn calculate_max_scroll_offset(&self, available_height: u16) -> u16 {
        let total_lines = self.build_display_lines().len() as u16;
        total_lines.saturating_sub(available_height)
    }

    fn scroll_up(&mut self, amount: u16, available_height: u16) {
        if self.auto_scroll {
            // Leave auto-scroll from the current bottom position.
            self.scroll_offset = self.calculate_max_scroll_offset(available_height);
            self.auto_scroll = false;
        }
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    fn scroll_down(&mut self, amount: u16, available_height: u16) {
        let max_scroll = self.calculate_max_scroll_offset(available_height);
        self.scroll_offset = self.scroll_offset.saturating_add(amount).min(max_scroll);
        if self.scroll_offset >= max_scroll {
            self.auto_scroll = true;
        }
    }
}

fn push_content_lines<'a>(lines: &mut Vec<Line<'a>>, content: &'a str, style: Style) {
    for content_line in content.lines() {
        if content_line.trim().is_empty() {
            lines.push(Line::from(""));
        } else {
            lines.push(Line::from(Span::styled(content_line, style)));
        }
    }
}

fn available_height(terminal_height: u16) -> u16 {
    terminal_height
        .saturating_sub(INPUT_AREA_HEIGHT)
        .saturating_sub(TITLE_HEIGHT)
}

fn ui(f: &mut Frame, app: &ChatApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(INPUT_AREA_HEIGHT)])
        .split(f.area());

    let lines = app.build_display_lines();
    let chat_height = chunks[0].height.saturating_sub(TITLE_HEIGHT);
    let total_lines = lines.len() as u16;
    let max_offset = total_lines.saturating_sub(chat_height);
    let scroll_offset = if app.auto_scroll {
        max_offset
    } else {
        app.scroll_offset.min(max_offset)
    };

    let messages_paragraph = Paragraph::new(lines)
        .block(Block::default().title("RPA Code Assistant"))
        .wrap(Wrap { trim: true })
        .scroll((scroll_offset, 0));
    f.render_widget(messages_paragraph, chunks[0]);

    let input_title = if app.streaming {
        "Type your message (streaming...)"
    } else {
        "Type your message (Enter to send, Ctrl+C to quit)"
    };
    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(input_title))
        .wrap(Wrap { trim: true });
    f.render_widget(input, chunks[1]);

    f.set_cursor_position((chunks[1].x + app.input.len() as u16 + 1, chunks[1].y + 1));
}

pub async fn run(
    config: Config,
    system_prompt: String,
    api_key: String,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let mut app = ChatApp::new(config, system_prompt, api_key, log_file);
    let (stream, mut rx) = ChatStreamService::new();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = loop {
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.cancel_in_flight();
                        break Ok(());
                    }
                    KeyCode::Enter => app.submit_input(&stream),
                    KeyCode::Char(c) => app.input.push(c),
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    KeyCode::Up => {
                        let height = available_height(terminal.size()?.height);
                        app.scroll_up(1, height);
                    }
                    KeyCode::Down => {
                        let height = available_height(terminal.size()?.height);
                        app.scroll_down(1, height);
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        let height = available_height(terminal.size()?.height);
                        app.scroll_up(3, height);
                    }
                    MouseEventKind::ScrollDown => {
                        let height = available_height(terminal.size()?.height);
                        app.scroll_down(3, height);
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Drain all stream events that arrived since the last poll.
        while let Ok((message, stream_id)) = rx.try_recv() {
            app.handle_stream_event(message, stream_id);
        }
    };

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
