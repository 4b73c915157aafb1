pub mod app;
pub mod ui;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::tui::app::{App, InputMode, Screen};

pub fn run(data_dir: Option<PathBuf>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(data_dir)?;
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(std::time::Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.screen {
            Screen::Login => match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Tab | KeyCode::Down | KeyCode::Up => app.toggle_login_focus(),
                KeyCode::Enter => app.attempt_login(),
                KeyCode::Backspace => app.login_backspace(),
                KeyCode::Char(c) => app.login_char(c),
                _ => {}
            },
            Screen::LotSelect => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('o') => app.sign_out(),
                KeyCode::Char('g') => app.open_dashboard(),
                KeyCode::Enter => app.submit_lot(),
                KeyCode::Backspace => app.lot_backspace(),
                // Lot keys are digits; letters stay free for shortcuts.
                KeyCode::Char(c) => app.lot_char(c),
                _ => {}
            },
            Screen::Records => match app.input_mode {
                InputMode::Normal if app.pending_delete.is_some() => match key.code {
                    KeyCode::Char('y') => app.confirm_delete(),
                    KeyCode::Char('n') | KeyCode::Esc => app.cancel_delete(),
                    _ => {}
                },
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('b') | KeyCode::Esc => app.back_to_lot_select(),
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Char('a') => app.enter_add_mode(),
                    KeyCode::Char('e') => app.enter_edit_mode(),
                    KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
                    KeyCode::Char('x') => app.export_selected_lot(),
                    KeyCode::Char('g') => app.open_dashboard(),
                    _ => {}
                },
                InputMode::Editing => match key.code {
                    KeyCode::Enter => app.submit_entry(),
                    KeyCode::Esc => app.exit_input_mode(),
                    KeyCode::Char(c) => app.input_char(c),
                    KeyCode::Backspace => app.delete_char(),
                    KeyCode::Left => app.move_cursor_left(),
                    KeyCode::Right => app.move_cursor_right(),
                    _ => {}
                },
            },
            Screen::Dashboard => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.ranking_next(),
                KeyCode::Up | KeyCode::Char('k') => app.ranking_previous(),
                KeyCode::Enter => app.open_ranked_lot(),
                KeyCode::Char('r') => app.refresh_dashboard(),
                KeyCode::Char('o') => app.sign_out(),
                KeyCode::Char('l') | KeyCode::Esc => app.back_to_lot_select(),
                _ => {}
            },
        }
    }
}
