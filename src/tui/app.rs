//! Ask page application loop
//!
//! `AppState` holds everything except the terminal so the event handling
//! can be driven from tests with a `TestBackend`. Answer requests run on a
//! spawned task and report back over a channel drained by the loop; the page
//! itself never leaves this thread.

use std::io::{self, Stdout};
use std::panic;
use std::sync::Arc;
use std::time::Instant;

use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tokio::sync::mpsc;

use crate::answer::{Answer, AnswerError, AnswerService};
use crate::page::AskPage;

use super::events::{Event, EventHandler};
use super::layout::PageLayout;
use super::pointer::PointerTracker;
use super::widgets::PageWidget;

type AnswerResult = Result<Answer, AnswerError>;

/// Page state plus the bits needed to route terminal events into it
pub struct AppState {
    page: AskPage,
    service: Arc<dyn AnswerService>,
    layout: PageLayout,
    pointer: PointerTracker,
    results_tx: mpsc::UnboundedSender<AnswerResult>,
    results_rx: mpsc::UnboundedReceiver<AnswerResult>,
    should_quit: bool,
}

impl AppState {
    pub fn new(page: AskPage, service: Arc<dyn AnswerService>) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            page,
            service,
            layout: PageLayout::default(),
            pointer: PointerTracker::new(),
            results_tx,
            results_rx,
            should_quit: false,
        }
    }

    pub fn page(&self) -> &AskPage {
        &self.page
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn into_page(self) -> AskPage {
        self.page
    }

    /// Lay out and draw the page, keeping the layout for hit-testing
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        self.layout = PageLayout::compute(&self.page, area);
        frame.render_widget(PageWidget::new(&self.page, &self.layout), area);
    }

    /// Handle one event; returns true if the page needs a redraw
    pub fn handle_event(&mut self, event: Event, now: Instant) -> bool {
        let mut redraw = self.drain_results();
        redraw |= self.page.tick(now);

        if event.is_quit() {
            self.should_quit = true;
            return true;
        }
        if event.is_enter() {
            return self.submit() || redraw;
        }

        match event {
            Event::Key(key) => self.handle_key(key) || redraw,
            Event::Mouse(mouse) => self.handle_mouse(mouse, now) || redraw,
            Event::Resize(..) => true,
            Event::Tick => redraw,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.page.input().push(c);
                true
            }
            KeyCode::Backspace => self.page.input().pop().is_some(),
            _ => false,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) -> bool {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => self.pointer.moved(
                &mut self.page,
                &self.layout,
                mouse.column,
                mouse.row,
                now,
            ),
            MouseEventKind::Down(MouseButton::Left) => self.pointer.pressed(
                &mut self.page,
                &self.layout,
                mouse.column,
                mouse.row,
                now,
            ),
            _ => false,
        }
    }

    /// Send the chat input to the answer service in the background
    fn submit(&mut self) -> bool {
        let Some(question) = self.page.begin_submit() else {
            return false;
        };
        tracing::debug!("answer request spawned");

        let service = Arc::clone(&self.service);
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let result = service.submit(&question).await;
            // Receiver is gone only when the app is shutting down
            let _ = tx.send(result);
        });
        true
    }

    /// Apply finished requests; returns true if any arrived
    pub fn drain_results(&mut self) -> bool {
        let mut any = false;
        while let Ok(result) = self.results_rx.try_recv() {
            self.page.finish_submit(result);
            any = true;
        }
        any
    }
}

/// Terminal application for the ask page
pub struct TuiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    events: EventHandler,
    state: AppState,
}

impl TuiApp {
    pub fn new(page: AskPage, service: Arc<dyn AnswerService>) -> anyhow::Result<Self> {
        Self::install_panic_hook();
        let terminal = Self::setup_terminal()?;
        Ok(Self {
            terminal,
            events: EventHandler::new(),
            state: AppState::new(page, service),
        })
    }

    /// Run until the user quits
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.render()?;

        while !self.state.should_quit() {
            let event = self.events.poll()?;
            if self.state.handle_event(event, Instant::now()) {
                self.render()?;
            }
            // Let spawned requests make progress on single-threaded runtimes
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    /// Restore the terminal and hand back the page
    pub fn finish(mut self) -> anyhow::Result<AskPage> {
        self.restore_terminal()?;
        Ok(self.state.into_page())
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let state = &mut self.state;
        self.terminal.draw(|frame| state.draw(frame))?;
        Ok(())
    }

    /// Restore the terminal before the default hook prints the panic
    fn install_panic_hook() {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = Self::restore_terminal_static();
            original_hook(panic_info);
        }));
    }

    fn restore_terminal_static() -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
        Ok(())
    }

    fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    fn restore_terminal(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disclosure::{DisclosureState, PresentationMode};
    use crate::page::AnswerStatus;
    use crate::template::library;
    use async_trait::async_trait;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    struct EchoService;

    #[async_trait]
    impl AnswerService for EchoService {
        async fn submit(&self, question: &str) -> Result<Answer, AnswerError> {
            Ok(Answer {
                text: format!("You asked: {}", question),
                charts: Vec::new(),
            })
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn state(mode: PresentationMode) -> (AppState, Terminal<TestBackend>) {
        let page = AskPage::new(library::builtin().unwrap(), mode, Duration::from_millis(140));
        let mut state = AppState::new(page, Arc::new(EchoService));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| state.draw(f)).unwrap();
        (state, terminal)
    }

    #[test]
    fn test_typing_edits_input() {
        let (mut state, _terminal) = state(PresentationMode::Inline);
        let before = state.page().chat_input();
        assert!(state.handle_event(key(KeyCode::Char('!')), Instant::now()));
        assert_eq!(state.page().chat_input(), format!("{}!", before));
        state.handle_event(key(KeyCode::Backspace), Instant::now());
        assert_eq!(state.page().chat_input(), before);
    }

    #[test]
    fn test_q_types_and_escape_quits() {
        let (mut state, _terminal) = state(PresentationMode::Inline);
        state.handle_event(key(KeyCode::Char('q')), Instant::now());
        assert!(!state.should_quit());
        state.handle_event(key(KeyCode::Esc), Instant::now());
        assert!(state.should_quit());
    }

    #[test]
    fn test_click_pill_then_option_updates_input() {
        let (mut state, mut terminal) = state(PresentationMode::Popup);
        let now = Instant::now();
        let pill = state.layout().pill_area(0, "country").unwrap();

        state.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), pill.x, pill.y), now);
        assert_eq!(
            state.page().widgets()[0].disclosure(),
            &DisclosureState::Open("country".to_string())
        );

        terminal.draw(|f| state.draw(f)).unwrap();
        let panel = state.layout().cards[0].panel.clone().unwrap();
        let (_, row) = panel
            .options
            .iter()
            .find(|(option, _)| option == "Germany")
            .unwrap()
            .clone();
        state.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), row.x, row.y), now);

        assert_eq!(
            state.page().chat_input(),
            "What are the top Net Revenue drivers in Germany for Oreo in QTD?"
        );
        assert_eq!(state.page().widgets()[0].disclosure(), &DisclosureState::Closed);
    }

    #[tokio::test]
    async fn test_enter_submits_in_background() {
        let (mut state, _terminal) = state(PresentationMode::Inline);
        assert!(state.handle_event(key(KeyCode::Enter), Instant::now()));
        assert!(state.page().is_loading());

        for _ in 0..100 {
            if state.drain_results() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        match state.page().status() {
            AnswerStatus::Answered(answer) => {
                assert_eq!(
                    answer.text,
                    "You asked: What is the Oreo net revenue trend in QTD?"
                );
            }
            other => panic!("unexpected status {:?}", other),
        }
    }
}
