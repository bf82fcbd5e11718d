use anyhow::Result;
use checklist_core::{Database, User};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    crossterm::{
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use std::io;
use tracing::error;

use crate::app::{Alert, App, ChecklistMode, ChecklistScreen, Form, MenuItem, Screen};

pub async fn run_app(db: &Database) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(db);

    let res = run_app_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "terminal loop failed");
    }

    res
}

async fn run_app_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Some(action) = app.handle_key(key) {
            if action.shows_loading() {
                app.loading = true;
                terminal.draw(|f| ui(f, app))?;
            }
            app.perform(action).await;
            app.loading = false;
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    match &mut app.screen {
        Screen::Login(form) | Screen::Signup(form) => draw_form(f, form, app.loading),
        Screen::Profile { user, .. } => draw_profile(f, user.as_ref()),
        Screen::Checklist(screen) => draw_checklist(f, screen),
    }

    if let Some(menu) = &mut app.menu {
        draw_menu(f, menu);
    }

    if app.show_help {
        draw_help(f);
    }

    if let Some(alert) = &app.alert {
        draw_alert(f, alert);
    }
}

fn focused_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block.border_style(Style::default().fg(Color::Blue))
    } else {
        block
    }
}

fn draw_form(f: &mut Frame, form: &Form, loading: bool) {
    let area = centered_rect(60, 80, f.area());
    let block = Block::default().title(form.title).borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(3); form.fields.len()];
    constraints.extend([Constraint::Length(2), Constraint::Length(1), Constraint::Min(0)]);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in form.fields.iter().enumerate() {
        let text = if field.secret {
            "*".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };
        let input = Paragraph::new(text).block(focused_block(field.label, form.focus == i));
        f.render_widget(input, chunks[i]);
    }

    let n = form.fields.len();
    let status = if loading {
        Paragraph::new("working...").style(Style::default().fg(Color::Cyan))
    } else {
        Paragraph::new(format!("enter: {} | tab: next field | esc: back", form.submit))
    };
    f.render_widget(status, chunks[n]);

    let link_style = if form.link_focused() {
        Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::Blue)
    };
    f.render_widget(Paragraph::new(form.link).style(link_style), chunks[n + 1]);
}

fn draw_profile(f: &mut Frame, user: Option<&User>) {
    let area = centered_rect(60, 60, f.area());
    let rows = [
        ("name", user.map(|u| u.name.as_str())),
        ("date of birth", user.map(|u| u.date_of_birth.as_str())),
        ("username", user.map(|u| u.username.as_str())),
        ("email", user.map(|u| u.email.as_str())),
    ];
    let mut lines: Vec<Line> = rows
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(
                    format!("{label:>14}: "),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(value.unwrap_or_default().to_string()),
            ])
        })
        .collect();
    lines.push(Line::default());
    lines.push(Line::from("enter: back to checklist | m: menu | q: quit"));

    let profile =
        Paragraph::new(lines).block(Block::default().title("profile").borders(Borders::ALL));
    f.render_widget(profile, area);
}

fn draw_checklist(f: &mut Frame, screen: &mut ChecklistScreen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    let edit = screen.checklist.edit_state();
    let task_items: Vec<ListItem> = screen
        .checklist
        .tasks()
        .iter()
        .map(|t| {
            let status = if t.completed { "✓" } else { " " };
            if edit.editing() == Some(t.id) {
                let draft = edit.draft().unwrap_or_default();
                ListItem::new(Span::styled(
                    format!("[{status}] {draft}_"),
                    Style::default().fg(Color::Yellow),
                ))
            } else if t.completed {
                ListItem::new(Span::styled(
                    format!("[{status}] {}", t.task_name),
                    Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM),
                ))
            } else {
                ListItem::new(Span::raw(format!("[{status}] {}", t.task_name)))
            }
        })
        .collect();

    let tasks = List::new(task_items)
        .block(focused_block("to-do list", true))
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    f.render_stateful_widget(tasks, chunks[0], &mut screen.task_state);

    let hint = if edit.editing().is_some() {
        "editing: enter/esc/tab to finish"
    } else {
        "a: add | space: done | e: edit | D: delete | m: menu | ?: help | q: quit"
    };
    f.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );

    match &screen.mode {
        ChecklistMode::Adding(buffer) => {
            let popup_area = centered_rect(60, 20, f.area());
            f.render_widget(Clear, popup_area);

            let input = Paragraph::new(buffer.as_str())
                .block(Block::default().title("new task").borders(Borders::ALL))
                .style(Style::default().fg(Color::Green));
            f.render_widget(input, popup_area);
        }
        ChecklistMode::DeleteConfirm { task_name, .. } => {
            let popup_area = centered_rect(60, 20, f.area());
            f.render_widget(Clear, popup_area);

            let confirm_text = format!("Delete '{task_name}'?\n\ny: confirm | n/esc: cancel");
            let confirm = Paragraph::new(confirm_text)
                .block(Block::default().title("confirm delete").borders(Borders::ALL))
                .style(Style::default().fg(Color::Red));
            f.render_widget(confirm, popup_area);
        }
        ChecklistMode::Normal => {}
    }
}

fn draw_menu(f: &mut Frame, menu: &mut ListState) {
    let area = f.area();
    let sidebar = Rect {
        width: area.width.min(24),
        ..area
    };
    f.render_widget(Clear, sidebar);

    let items: Vec<ListItem> = MenuItem::ALL
        .iter()
        .map(|item| {
            let style = if *item == MenuItem::Logout {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(item.label(), style))
        })
        .collect();

    let list = List::new(items)
        .block(focused_block("menu", true))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, sidebar, menu);
}

fn draw_help(f: &mut Frame) {
    let popup_area = centered_rect(80, 60, f.area());
    f.render_widget(Clear, popup_area);

    let help_text = concat!(
        "HELP\n\n",
        "Checklist:\n",
        "  j/k: move up/down\n",
        "  a: add a task\n",
        "  space/c: mark done / not done\n",
        "  e/r/enter: edit the selected task (enter, esc or tab to finish)\n",
        "  D: delete the selected task\n",
        "  p: profile\n\n",
        "Everywhere:\n",
        "  m: menu (checklist, profile, logout)\n",
        "  ?: show/hide this help\n",
        "  q: quit\n\n",
        "Press ? or ESC to close",
    );
    let help = Paragraph::new(help_text)
        .block(Block::default().title("help").borders(Borders::ALL))
        .style(Style::default().fg(Color::White));
    f.render_widget(help, popup_area);
}

fn draw_alert(f: &mut Frame, alert: &Alert) {
    let popup_area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, popup_area);

    let color = if alert.is_error() {
        Color::Red
    } else {
        Color::Green
    };
    let text = format!("{}\n\nenter: ok", alert.message);
    let popup = Paragraph::new(text)
        .block(Block::default().title(alert.title).borders(Borders::ALL))
        .style(Style::default().fg(color));
    f.render_widget(popup, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
